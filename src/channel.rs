//! Quantum channel simulator.
//!
//! Models the only attack considered here, intercept-resend: with a
//! configured probability Eve measures the passing qubit in a random basis
//! and forwards a fresh qubit prepared from her outcome. Independently, a
//! bit-flip noise probability models channel and detector imperfections.
//!
//! The interception flags recorded per transmission are simulation oracles
//! for tests and diagnostics; Alice and Bob never consult them, since the
//! real parties would have no way to.

use rand::Rng;

use crate::states::{Basis, Measurement, Qubit};

/// One position of the transmission record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// What Alice put on the wire.
    pub sent: Qubit,
    /// What Bob observed at his end.
    pub measurement: Measurement,
    /// Whether Eve touched this position (oracle, not protocol data).
    pub intercepted: bool,
    /// Eve's measured bit when she did (oracle, not protocol data).
    pub eve_bit: Option<bool>,
}

/// Running channel counters. Diagnostics only, never authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub transmissions: usize,
    pub interceptions: usize,
    pub noise_flips: usize,
}

/// A noisy, possibly tapped quantum channel between Alice and Bob.
#[derive(Debug, Clone)]
pub struct QuantumChannel {
    intercept_probability: f64,
    noise_probability: f64,
    stats: ChannelStats,
}

impl QuantumChannel {
    pub fn new(intercept_probability: f64, noise_probability: f64) -> Self {
        QuantumChannel {
            intercept_probability,
            noise_probability,
            stats: ChannelStats::default(),
        }
    }

    /// Send one qubit through the channel and measure it at Bob's end.
    ///
    /// Bob's basis is committed before the arriving state plays any role.
    pub fn transmit<R: Rng>(&mut self, qubit: Qubit, rng: &mut R) -> Transmission {
        self.stats.transmissions += 1;
        let sent = qubit.clone();

        // Intercept-resend: Eve measures in her own random basis and re-sends
        // a fresh qubit encoding her outcome.
        let (arriving, eve_bit) = if rng.gen::<f64>() < self.intercept_probability {
            self.stats.interceptions += 1;
            let eve_basis = Basis::random(rng);
            let bit = qubit.measure(eve_basis, rng);
            (Qubit::prepare(bit, eve_basis), Some(bit))
        } else {
            (qubit, None)
        };

        let bob_basis = Basis::random(rng);
        let mut bit = arriving.measure(bob_basis, rng);

        // Detector/channel noise flips the outcome regardless of basis match.
        if rng.gen::<f64>() < self.noise_probability {
            self.stats.noise_flips += 1;
            bit = !bit;
        }

        Transmission {
            sent,
            measurement: Measurement {
                bit,
                basis: bob_basis,
            },
            intercepted: eve_bit.is_some(),
            eve_bit,
        }
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn send_n(channel: &mut QuantumChannel, n: usize, seed: u64) -> Vec<Transmission> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let qubit = Qubit::prepare(rng.gen(), Basis::random(&mut rng));
                channel.transmit(qubit, &mut rng)
            })
            .collect()
    }

    #[test]
    fn clean_channel_agrees_on_matching_bases() {
        let mut channel = QuantumChannel::new(0.0, 0.0);
        for t in send_n(&mut channel, 2_000, 10) {
            if t.sent.basis == t.measurement.basis {
                assert_eq!(t.sent.bit, t.measurement.bit);
            }
            assert!(!t.intercepted);
        }
        assert_eq!(channel.stats().interceptions, 0);
        assert_eq!(channel.stats().noise_flips, 0);
    }

    #[test]
    fn full_interception_touches_every_position() {
        let mut channel = QuantumChannel::new(1.0, 0.0);
        let record = send_n(&mut channel, 500, 11);
        assert!(record.iter().all(|t| t.intercepted && t.eve_bit.is_some()));
        assert_eq!(channel.stats().interceptions, 500);
    }

    #[test]
    fn certain_noise_flips_every_outcome() {
        let mut channel = QuantumChannel::new(0.0, 1.0);
        let record = send_n(&mut channel, 500, 12);
        assert_eq!(channel.stats().noise_flips, 500);
        // On matching bases the observed bit must be the inverse.
        for t in record {
            if t.sent.basis == t.measurement.basis {
                assert_ne!(t.sent.bit, t.measurement.bit);
            }
        }
    }

    #[test]
    fn interception_disturbs_matching_basis_positions() {
        // Intercept-resend should produce ~25% error on matched bases.
        let mut channel = QuantumChannel::new(1.0, 0.0);
        let record = send_n(&mut channel, 8_000, 13);
        let matched: Vec<_> = record
            .iter()
            .filter(|t| t.sent.basis == t.measurement.basis)
            .collect();
        let errors = matched
            .iter()
            .filter(|t| t.sent.bit != t.measurement.bit)
            .count();
        let rate = errors as f64 / matched.len() as f64;
        assert!(
            (0.20..0.30).contains(&rate),
            "intercept-resend error rate should be near 0.25, got {}",
            rate
        );
    }

    #[test]
    fn identical_seed_gives_identical_transcript() {
        let mut a = QuantumChannel::new(0.3, 0.05);
        let mut b = QuantumChannel::new(0.3, 0.05);
        assert_eq!(send_n(&mut a, 300, 14), send_n(&mut b, 300, 14));
        assert_eq!(a.stats(), b.stats());
    }
}
