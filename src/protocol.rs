//! One full BB84 run: configuration, orchestration and statistics.
//!
//! The run wires the pipeline together while keeping Alice and Bob as
//! separate values whose secrets cross the boundary only as the public
//! messages recorded on the transcript. All randomness flows from one
//! seedable generator, so a fixed seed reproduces the run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::cascade::{self, CascadeParams};
use crate::channel::QuantumChannel;
use crate::detection::{self, DetectionParams};
use crate::error::ProtocolError;
use crate::party::{Alice, Bob};
use crate::privacy;
use crate::sifting;
use crate::states::Measurement;
use crate::transcript::{MessageKind, Transcript};

/// Configuration for one protocol run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    /// Number of qubits Alice sends. Needs to be several times the desired
    /// final key length: sifting halves it and detection eats a further
    /// sample.
    pub num_qubits: usize,
    /// Whether an eavesdropper sits on the channel at all.
    pub eve_present: bool,
    /// Per-qubit interception probability when Eve is present.
    pub eve_intercept_probability: f64,
    /// Independent bit-flip probability at Bob's detector.
    pub channel_noise_probability: f64,
    /// Fraction of the sifted key revealed for QBER estimation.
    pub detection_sample_fraction: f64,
    /// Sample QBER above this aborts the run.
    pub qber_abort_threshold: f64,
    /// Number of Cascade passes.
    pub cascade_passes: usize,
    /// Block size of the first Cascade pass; doubles every pass.
    pub cascade_initial_block_size: usize,
    /// Minimum sifted length required to attempt detection.
    pub min_sifted_bits: usize,
    /// Minimum key length that must survive the detection sample.
    pub min_remaining_bits: usize,
    /// Fixed safety term added to the privacy-amplification margin.
    pub margin_safety_bits: usize,
    /// Consecutive clean verification parities required to certify.
    pub verify_rounds: usize,
    /// Upper bound on verification rounds before reconciliation gives up.
    pub max_correction_rounds: usize,
    /// Seed for the run; `None` draws one from the OS.
    pub random_seed: Option<u64>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            num_qubits: 2000,
            eve_present: false,
            eve_intercept_probability: 1.0,
            channel_noise_probability: 0.01,
            detection_sample_fraction: 0.25,
            qber_abort_threshold: 0.11,
            cascade_passes: 4,
            cascade_initial_block_size: 8,
            min_sifted_bits: 64,
            min_remaining_bits: 32,
            margin_safety_bits: 32,
            verify_rounds: 12,
            max_correction_rounds: 64,
            random_seed: None,
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let fail = |reason: &str| {
            Err(ProtocolError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.num_qubits == 0 {
            return fail("num_qubits must be positive");
        }
        if !(0.0..=1.0).contains(&self.eve_intercept_probability) {
            return fail("eve_intercept_probability must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.channel_noise_probability) {
            return fail("channel_noise_probability must lie in [0, 1]");
        }
        if !(self.detection_sample_fraction > 0.0 && self.detection_sample_fraction < 1.0) {
            return fail("detection_sample_fraction must lie in (0, 1)");
        }
        if !(self.qber_abort_threshold > 0.0 && self.qber_abort_threshold < 1.0) {
            return fail("qber_abort_threshold must lie in (0, 1)");
        }
        if self.cascade_passes == 0 || self.cascade_passes > 16 {
            return fail("cascade_passes must lie in 1..=16");
        }
        if self.cascade_initial_block_size < 2 {
            return fail("cascade_initial_block_size must be at least 2");
        }
        if self.min_remaining_bits == 0 {
            return fail("min_remaining_bits must be positive");
        }
        if self.verify_rounds == 0 {
            return fail("verify_rounds must be positive");
        }
        if self.max_correction_rounds == 0 {
            return fail("max_correction_rounds must be positive");
        }
        Ok(())
    }
}

/// Aggregate statistics for one run. Non-authoritative diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub qubits_sent: usize,
    pub sifted_bits: usize,
    pub sampled_bits: usize,
    pub corrected_bits: usize,
    pub cascade_corrections: usize,
    pub leaked_bits: u64,
    pub final_bits: usize,
    /// Channel oracle: positions Eve touched. Never protocol-visible.
    pub interceptions: usize,
    /// Channel oracle: positions noise flipped. Never protocol-visible.
    pub noise_flips: usize,
}

impl RunStats {
    /// Final key bits per qubit sent, as a percentage.
    pub fn efficiency(&self) -> f64 {
        if self.qubits_sent == 0 {
            return 0.0;
        }
        self.final_bits as f64 / self.qubits_sent as f64 * 100.0
    }
}

/// A successful run: both parties' final keys plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolOutcome {
    pub alice_key: Vec<bool>,
    pub bob_key: Vec<bool>,
    /// Observed sample QBER, the residual-error estimate.
    pub qber: f64,
    pub stats: RunStats,
}

impl ProtocolOutcome {
    /// The shared secret. Alice's copy is canonical; both copies are
    /// identical by construction, and the tests hold this rather than
    /// assume it.
    pub fn final_key(&self) -> &[bool] {
        &self.alice_key
    }
}

/// Execute one complete BB84 run.
pub fn run(config: &ProtocolConfig) -> Result<ProtocolOutcome, ProtocolError> {
    let mut rng = match config.random_seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    run_with_rng(config, &mut rng)
}

/// Like [`run`], drawing from a caller-supplied generator so Monte Carlo
/// sweeps can share one seeded stream.
pub fn run_with_rng<R: Rng>(
    config: &ProtocolConfig,
    rng: &mut R,
) -> Result<ProtocolOutcome, ProtocolError> {
    config.validate()?;

    // Quantum phase: Alice prepares, the channel delivers, Bob records.
    let (mut alice, qubits) = Alice::prepare(config.num_qubits, rng);
    let intercept_probability = if config.eve_present {
        config.eve_intercept_probability
    } else {
        0.0
    };
    let mut channel = QuantumChannel::new(intercept_probability, config.channel_noise_probability);
    let measurements: Vec<Measurement> = qubits
        .into_iter()
        .map(|qubit| channel.transmit(qubit, rng).measurement)
        .collect();
    let mut bob = Bob::from_measurements(&measurements);

    // Everything from here on rides the public transcript.
    let mut transcript = Transcript::new();
    transcript.announce(MessageKind::BasisAnnouncement, config.num_qubits);
    transcript.announce(MessageKind::BasisAnnouncement, config.num_qubits);
    let indices = sifting::matching_indices(alice.bases(), bob.bases());
    alice.sift(&indices);
    bob.sift(&indices);
    let sifted_bits = indices.len();
    debug!(sifted_bits, "sifting complete");

    let detection = detection::estimate(
        &mut alice,
        &mut bob,
        &DetectionParams {
            sample_fraction: config.detection_sample_fraction,
            qber_threshold: config.qber_abort_threshold,
            min_sifted_bits: config.min_sifted_bits,
            min_remaining_bits: config.min_remaining_bits,
        },
        &mut transcript,
        rng,
    )?;
    debug!(
        qber = detection.qber,
        sample = detection.sample_size,
        "detection passed"
    );

    let cascade = cascade::reconcile(
        &alice,
        &mut bob,
        &CascadeParams {
            passes: config.cascade_passes,
            initial_block_size: config.cascade_initial_block_size,
            verify_rounds: config.verify_rounds,
            max_correction_rounds: config.max_correction_rounds,
        },
        &mut transcript,
        rng,
    )?;
    let corrected_bits = alice.key_len();

    let margin_bits = privacy::security_margin(detection.qber, corrected_bits, config.margin_safety_bits);
    let final_bits = privacy::amplified_len(
        corrected_bits,
        detection.qber,
        cascade.leaked_bits,
        config.margin_safety_bits,
    )
    .ok_or(ProtocolError::KeyExhausted {
        corrected_bits,
        leaked_bits: cascade.leaked_bits,
        margin_bits,
    })?;

    let hash_seed: u64 = rng.gen();
    transcript.announce(MessageKind::HashSeed, 1);
    let alice_key = privacy::toeplitz_compress(alice.key(), final_bits, hash_seed);
    let bob_key = privacy::toeplitz_compress(bob.key(), final_bits, hash_seed);
    debug!(
        final_bits,
        leaked_bits = cascade.leaked_bits,
        "privacy amplification complete"
    );

    let channel_stats = channel.stats();
    Ok(ProtocolOutcome {
        alice_key,
        bob_key,
        qber: detection.qber,
        stats: RunStats {
            qubits_sent: config.num_qubits,
            sifted_bits,
            sampled_bits: detection.sample_size,
            corrected_bits,
            cascade_corrections: cascade.corrections,
            leaked_bits: cascade.leaked_bits,
            final_bits,
            interceptions: channel_stats.interceptions,
            noise_flips: channel_stats.noise_flips,
        },
    })
}
