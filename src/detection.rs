//! Eavesdropping detection via QBER estimation.
//!
//! A random subset of the sifted key is revealed in the clear by both
//! parties and compared. Intercept-resend raises the error rate on matched
//! bases to ~25%, so a threshold well below that separates an attack from
//! ordinary channel noise. Revealed positions are public afterwards and
//! leave the usable key permanently.

use rand::Rng;

use crate::error::ProtocolError;
use crate::party::{Alice, Bob};
use crate::transcript::{MessageKind, Transcript};

/// Limits and thresholds for the detection phase.
#[derive(Debug, Clone, Copy)]
pub struct DetectionParams {
    /// Fraction of the sifted key to reveal.
    pub sample_fraction: f64,
    /// Sample QBER above this aborts the run.
    pub qber_threshold: f64,
    /// Minimum sifted length required to attempt detection at all.
    pub min_sifted_bits: usize,
    /// Minimum key length that must survive the sample.
    pub min_remaining_bits: usize,
}

/// Result of the detection phase when the run is allowed to continue.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    /// Observed error rate, carried forward as the residual-error estimate.
    pub qber: f64,
    pub sample_size: usize,
    pub mismatches: usize,
    /// The revealed (and discarded) positions, in the pre-discard indexing.
    pub positions: Vec<usize>,
}

/// Sample, compare, discard, decide.
pub fn estimate<R: Rng>(
    alice: &mut Alice,
    bob: &mut Bob,
    params: &DetectionParams,
    transcript: &mut Transcript,
    rng: &mut R,
) -> Result<DetectionOutcome, ProtocolError> {
    let sifted = alice.key_len();
    debug_assert_eq!(sifted, bob.key_len());

    if sifted < params.min_sifted_bits {
        return Err(ProtocolError::InsufficientKeyMaterial {
            available: sifted,
            required: params.min_sifted_bits,
        });
    }

    let sample_size = (sifted as f64 * params.sample_fraction).ceil() as usize;
    let remaining = sifted - sample_size;
    if remaining < params.min_remaining_bits {
        return Err(ProtocolError::InsufficientKeyMaterial {
            available: remaining,
            required: params.min_remaining_bits,
        });
    }

    // Positions drawn without replacement from a publicly agreed coin.
    let mut positions = rand::seq::index::sample(rng, sifted, sample_size).into_vec();
    positions.sort_unstable();
    transcript.announce(MessageKind::SampleIndices, sample_size);

    let alice_bits = alice.reveal(&positions);
    let bob_bits = bob.reveal(&positions);
    transcript.announce(MessageKind::SampleReveal, 2 * sample_size);

    let mismatches = alice_bits
        .iter()
        .zip(&bob_bits)
        .filter(|&(a, b)| a != b)
        .count();
    let qber = mismatches as f64 / sample_size as f64;

    // The revealed positions are public now; neither side may keep them.
    alice.discard(&positions);
    bob.discard(&positions);

    if qber > params.qber_threshold {
        return Err(ProtocolError::EavesdroppingDetected {
            qber,
            threshold: params.qber_threshold,
        });
    }

    Ok(DetectionOutcome {
        qber,
        sample_size,
        mismatches,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn params() -> DetectionParams {
        DetectionParams {
            sample_fraction: 0.25,
            qber_threshold: 0.11,
            min_sifted_bits: 16,
            min_remaining_bits: 8,
        }
    }

    #[test]
    fn short_sifted_key_aborts() {
        let mut alice = Alice::from_key_bits(vec![true; 8]);
        let mut bob = Bob::from_key_bits(vec![true; 8]);
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(30);

        let err = estimate(&mut alice, &mut bob, &params(), &mut transcript, &mut rng)
            .expect_err("8 sifted bits must not pass a 16-bit minimum");
        assert_eq!(
            err,
            ProtocolError::InsufficientKeyMaterial {
                available: 8,
                required: 16
            }
        );
    }

    #[test]
    fn oversized_sample_aborts_on_the_remainder() {
        let mut alice = Alice::from_key_bits(vec![true; 20]);
        let mut bob = Bob::from_key_bits(vec![true; 20]);
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let p = DetectionParams {
            sample_fraction: 0.9,
            ..params()
        };

        let err = estimate(&mut alice, &mut bob, &p, &mut transcript, &mut rng)
            .expect_err("a 90% sample of 20 bits leaves too little");
        assert!(matches!(err, ProtocolError::InsufficientKeyMaterial { .. }));
    }

    #[test]
    fn identical_keys_measure_zero_qber() {
        let key: Vec<bool> = (0..100).map(|i| i % 3 == 0).collect();
        let mut alice = Alice::from_key_bits(key.clone());
        let mut bob = Bob::from_key_bits(key);
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(32);

        let outcome =
            estimate(&mut alice, &mut bob, &params(), &mut transcript, &mut rng).unwrap();
        assert_eq!(outcome.qber, 0.0);
        assert_eq!(outcome.mismatches, 0);
        assert_eq!(outcome.sample_size, 25);
        assert_eq!(alice.key_len(), 75);
        assert_eq!(bob.key_len(), 75);
    }

    #[test]
    fn fully_mismatched_keys_abort() {
        let mut alice = Alice::from_key_bits(vec![true; 64]);
        let mut bob = Bob::from_key_bits(vec![false; 64]);
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(33);

        let err = estimate(&mut alice, &mut bob, &params(), &mut transcript, &mut rng)
            .expect_err("QBER of 1.0 must abort");
        match err {
            ProtocolError::EavesdroppingDetected { qber, threshold } => {
                assert_eq!(qber, 1.0);
                assert_eq!(threshold, 0.11);
            }
            other => panic!("expected EavesdroppingDetected, got {other:?}"),
        }
    }

    #[test]
    fn sampled_positions_leave_the_key() {
        let key: Vec<bool> = (0..80).map(|i| i % 2 == 0).collect();
        let mut alice = Alice::from_key_bits(key.clone());
        let mut bob = Bob::from_key_bits(key.clone());
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(34);

        let outcome =
            estimate(&mut alice, &mut bob, &params(), &mut transcript, &mut rng).unwrap();

        let expected: Vec<bool> = key
            .iter()
            .enumerate()
            .filter(|(i, _)| !outcome.positions.contains(i))
            .map(|(_, &b)| b)
            .collect();
        assert_eq!(alice.key(), expected.as_slice());
        assert_eq!(bob.key(), expected.as_slice());
        assert_eq!(alice.key_len(), 80 - outcome.sample_size);
    }

    #[test]
    fn sample_exchange_is_logged_but_not_leak_counted() {
        let key = vec![false; 40];
        let mut alice = Alice::from_key_bits(key.clone());
        let mut bob = Bob::from_key_bits(key);
        let mut transcript = Transcript::new();
        let mut rng = ChaCha20Rng::seed_from_u64(35);

        estimate(&mut alice, &mut bob, &params(), &mut transcript, &mut rng).unwrap();
        assert_eq!(transcript.count(MessageKind::SampleIndices), 1);
        assert_eq!(transcript.count(MessageKind::SampleReveal), 1);
        // Sample bits are discarded outright, not folded into the leak budget.
        assert_eq!(transcript.leaked_parity_bits(), 0);
    }
}
