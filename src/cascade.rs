//! Cascade error reconciliation.
//!
//! Multi-pass block-parity comparison over publicly permuted copies of the
//! remaining key. A block whose parities disagree holds an odd number of
//! mismatches; recursive bisection isolates one and flips Bob's bit. Every
//! public parity comparison leaks one bit of information and is tallied on
//! the transcript so privacy amplification can subtract the exact total.
//!
//! A full-key parity check alone cannot see an even number of residual
//! mismatches, so certification finishes with publicly seeded random-subset
//! parity checks: each surviving mismatch pattern passes a random subset
//! with probability 1/2, and a streak of clean checks bounds the residual
//! failure probability at 2^-verify_rounds.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::error::ProtocolError;
use crate::party::{Alice, Bob};
use crate::transcript::{MessageKind, Transcript};

/// Tuning for the reconciliation phase.
#[derive(Debug, Clone, Copy)]
pub struct CascadeParams {
    /// Number of block-parity passes.
    pub passes: usize,
    /// Block size of the first pass; doubles every pass.
    pub initial_block_size: usize,
    /// Consecutive clean verification parities required to certify.
    pub verify_rounds: usize,
    /// Upper bound on verification rounds before giving up.
    pub max_correction_rounds: usize,
}

/// Summary of a finished reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Bits flipped on Bob's side. Each flip repairs a genuine mismatch.
    pub corrections: usize,
    /// Parity bits revealed during this phase.
    pub leaked_bits: u64,
}

/// Reconcile Bob's key toward Alice's.
///
/// On success the two working keys are equal up to the certification bound;
/// the keys themselves never cross the public channel, only parities do.
pub fn reconcile<R: Rng>(
    alice: &Alice,
    bob: &mut Bob,
    params: &CascadeParams,
    transcript: &mut Transcript,
    rng: &mut R,
) -> Result<CascadeOutcome, ProtocolError> {
    let n = alice.key_len();
    debug_assert_eq!(n, bob.key_len());
    let leaked_before = transcript.leaked_parity_bits();
    let mut corrections = 0usize;

    for pass in 0..params.passes {
        let block_size = params.initial_block_size << pass;

        // Both sides shuffle identically from a seed exchanged in the clear.
        let pass_seed: u64 = rng.gen();
        transcript.announce(MessageKind::PassSeed, 1);
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut ChaCha20Rng::seed_from_u64(pass_seed));

        let mut pass_corrections = 0usize;
        for block in order.chunks(block_size) {
            let agree = transcript.compare_parity(alice.parity(block), bob.parity(block));
            if !agree {
                bisect(alice, bob, block, transcript);
                corrections += 1;
                pass_corrections += 1;
            }
        }
        debug!(
            pass = pass + 1,
            block_size,
            corrections = pass_corrections,
            "cascade pass complete"
        );
    }

    // Certification. The first round and every round after a correction
    // check the whole key, catching any odd residual immediately; clean
    // rounds draw random subsets until the streak is long enough.
    let all: Vec<usize> = (0..n).collect();
    let mut clean_streak = 0usize;
    let mut rounds = 0usize;
    let mut check_whole_key = true;

    while clean_streak < params.verify_rounds {
        if rounds >= params.max_correction_rounds {
            return Err(ProtocolError::ReconciliationFailed { rounds });
        }
        rounds += 1;

        let subset: Vec<usize> = if check_whole_key {
            all.clone()
        } else {
            let subset_seed: u64 = rng.gen();
            transcript.announce(MessageKind::VerifySeed, 1);
            let mut pick = ChaCha20Rng::seed_from_u64(subset_seed);
            all.iter().copied().filter(|_| pick.gen()).collect()
        };

        if transcript.compare_parity(alice.parity(&subset), bob.parity(&subset)) {
            clean_streak += 1;
            check_whole_key = false;
        } else {
            clean_streak = 0;
            check_whole_key = true;
            bisect(alice, bob, &subset, transcript);
            corrections += 1;
        }
    }

    let leaked_bits = transcript.leaked_parity_bits() - leaked_before;
    debug!(corrections, leaked_bits, "reconciliation certified");
    Ok(CascadeOutcome {
        corrections,
        leaked_bits,
    })
}

/// Binary-search a span whose parities disagree down to the single differing
/// position and flip Bob's bit there.
///
/// Only the left half is compared at each level; the right half's parity is
/// implied. One leaked bit per level.
fn bisect(alice: &Alice, bob: &mut Bob, span: &[usize], transcript: &mut Transcript) {
    debug_assert!(!span.is_empty(), "cannot bisect an empty span");
    let mut span = span.to_vec();
    while span.len() > 1 {
        let mid = span.len() / 2;
        let left = &span[..mid];
        if transcript.compare_parity(alice.parity(left), bob.parity(left)) {
            // Mismatch sits in the right half.
            span.drain(..mid);
        } else {
            span.truncate(mid);
        }
    }
    bob.flip(span[0]);
}
