//! Bit/basis data model for the BB84 exchange.
//!
//! A qubit is abstracted as the (bit, basis) pair that prepared it. Measuring
//! in the preparation basis reproduces the encoded bit; measuring in the
//! conjugate basis collapses to a uniformly random outcome. This is the full
//! extent of quantum behaviour the protocol relies on, so no state vectors
//! are carried around.

use rand::Rng;

/// The two conjugate encoding bases of BB84.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// + basis (0°/90°): |0⟩ and |1⟩.
    Rectilinear,
    /// × basis (45°/135°): |+⟩ and |−⟩.
    Diagonal,
}

impl Basis {
    /// Choose a basis uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen() {
            Basis::Rectilinear
        } else {
            Basis::Diagonal
        }
    }
}

/// A qubit in flight, described by the (bit, basis) pair that prepared it.
///
/// Deliberately not `Copy`: the channel consumes each qubit exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qubit {
    pub bit: bool,
    pub basis: Basis,
}

impl Qubit {
    pub fn prepare(bit: bool, basis: Basis) -> Self {
        Qubit { bit, basis }
    }

    /// Measure in `basis`, consuming the qubit.
    ///
    /// A matching basis yields the encoded bit; the conjugate basis yields a
    /// 50/50 outcome.
    pub fn measure<R: Rng>(self, basis: Basis, rng: &mut R) -> bool {
        if self.basis == basis {
            self.bit
        } else {
            rng.gen()
        }
    }
}

/// A receiver-side measurement: the basis committed to and the observed bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub bit: bool,
    pub basis: Basis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn matching_basis_reproduces_bit() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for &bit in &[false, true] {
            for &basis in &[Basis::Rectilinear, Basis::Diagonal] {
                let qubit = Qubit::prepare(bit, basis);
                assert_eq!(qubit.measure(basis, &mut rng), bit);
            }
        }
    }

    #[test]
    fn conjugate_basis_is_unbiased() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let trials = 10_000;
        let mut ones = 0;
        for _ in 0..trials {
            let qubit = Qubit::prepare(false, Basis::Rectilinear);
            if qubit.measure(Basis::Diagonal, &mut rng) {
                ones += 1;
            }
        }
        let ratio = ones as f64 / trials as f64;
        assert!(
            (0.45..0.55).contains(&ratio),
            "wrong-basis outcome should be ~50/50, got {}",
            ratio
        );
    }

    #[test]
    fn basis_choice_is_balanced() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let trials = 10_000;
        let rectilinear = (0..trials)
            .filter(|_| Basis::random(&mut rng) == Basis::Rectilinear)
            .count();
        let ratio = rectilinear as f64 / trials as f64;
        assert!(
            (0.45..0.55).contains(&ratio),
            "basis choice should be ~50/50, got {}",
            ratio
        );
    }
}
