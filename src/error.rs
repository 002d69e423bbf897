//! Failure taxonomy for a protocol run.
//!
//! Every variant is a terminal, first-class outcome of the run rather than
//! an exception-for-control-flow; each carries the diagnostics available at
//! the stage that failed, and no partial key ever escapes alongside one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// Sample QBER exceeded the abort threshold; interception assumed.
    #[error("eavesdropping detected: QBER {qber:.3} above threshold {threshold:.3}")]
    EavesdroppingDetected { qber: f64, threshold: f64 },

    /// Not enough key material to proceed safely.
    #[error("insufficient key material: {available} bits available, {required} required")]
    InsufficientKeyMaterial { available: usize, required: usize },

    /// Cascade could not certify equal keys within the round bound.
    #[error("reconciliation failed to converge after {rounds} rounds")]
    ReconciliationFailed { rounds: usize },

    /// Privacy amplification would output nothing.
    #[error(
        "key exhausted: {corrected_bits} corrected bits minus {leaked_bits} leaked \
         and {margin_bits} margin leaves no key"
    )]
    KeyExhausted {
        corrected_bits: usize,
        leaked_bits: u64,
        margin_bits: usize,
    },

    /// Configuration rejected before the run started.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Failures surfaced by the messaging wrapper, not by the core protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessagingError {
    /// Ciphertext failed authentication: tampered, or wrong key.
    #[error("message authentication failed")]
    Authentication,

    /// Sealing failed before any ciphertext was produced.
    #[error("encryption failed")]
    Encryption,

    /// An empty key cannot be stretched into a cipher key.
    #[error("cannot derive a cipher key from an empty bit string")]
    EmptyKey,
}
