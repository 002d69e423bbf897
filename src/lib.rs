//! # bb84-qkd-sim
//!
//! Simulated BB84 quantum key distribution between two parties.
//!
//! One run sends a stream of (bit, basis)-encoded qubits from Alice to Bob
//! through a channel that may flip bits and may host an intercept-resend
//! eavesdropper, then distills a shared secret over a public transcript:
//! sifting, QBER-based eavesdropping detection, Cascade parity
//! reconciliation with leakage accounting, and Toeplitz privacy
//! amplification. A thin AES-GCM wrapper consumes the final key.
//!
//! ## Pipeline
//!
//! randomness → channel → sifting → detection → (abort | cascade) →
//! privacy amplification → final key → messaging
//!
//! Runs are reproducible: a fixed `random_seed` in [`protocol::ProtocolConfig`]
//! yields an identical transcript and identical keys.

pub mod cascade;
pub mod channel;
pub mod detection;
pub mod error;
pub mod messaging;
pub mod party;
pub mod privacy;
pub mod protocol;
pub mod sifting;
pub mod states;
pub mod transcript;

pub mod prelude {
    pub use crate::cascade::{CascadeOutcome, CascadeParams};
    pub use crate::channel::{ChannelStats, QuantumChannel, Transmission};
    pub use crate::detection::{DetectionOutcome, DetectionParams};
    pub use crate::error::{MessagingError, ProtocolError};
    pub use crate::messaging::{decrypt, derive_key, encrypt, SealedMessage};
    pub use crate::party::{Alice, Bob};
    pub use crate::privacy::{amplified_len, security_margin, toeplitz_compress};
    pub use crate::protocol::{run, run_with_rng, ProtocolConfig, ProtocolOutcome, RunStats};
    pub use crate::sifting::matching_indices;
    pub use crate::states::{Basis, Measurement, Qubit};
    pub use crate::transcript::{MessageKind, Transcript};
}
