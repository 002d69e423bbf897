//! Basis reconciliation.
//!
//! After the quantum phase both parties announce their basis sequences in
//! the clear (bit values stay private) and keep only the positions where
//! the bases agree.

use crate::states::Basis;

/// Indices where the two public basis announcements agree.
///
/// Both parties evaluate this over the same exchanged data, so the result
/// is identical regardless of which side computes it. O(N).
pub fn matching_indices(alice: &[Basis], bob: &[Basis]) -> Vec<usize> {
    alice
        .iter()
        .zip(bob.iter())
        .enumerate()
        .filter(|&(_, (a, b))| a == b)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::Basis::{Diagonal, Rectilinear};

    #[test]
    fn keeps_only_matching_positions() {
        let alice = [Rectilinear, Diagonal, Diagonal, Rectilinear];
        let bob = [Rectilinear, Rectilinear, Diagonal, Diagonal];
        assert_eq!(matching_indices(&alice, &bob), vec![0, 2]);
    }

    #[test]
    fn symmetric_between_parties() {
        let alice = [Diagonal, Diagonal, Rectilinear, Diagonal, Rectilinear];
        let bob = [Rectilinear, Diagonal, Rectilinear, Rectilinear, Diagonal];
        assert_eq!(matching_indices(&alice, &bob), matching_indices(&bob, &alice));
    }

    #[test]
    fn identical_announcements_keep_everything() {
        let bases = [Rectilinear, Diagonal, Rectilinear];
        assert_eq!(matching_indices(&bases, &bases), vec![0, 1, 2]);
    }

    #[test]
    fn disjoint_announcements_keep_nothing() {
        let alice = [Rectilinear, Rectilinear];
        let bob = [Diagonal, Diagonal];
        assert!(matching_indices(&alice, &bob).is_empty());
    }
}
