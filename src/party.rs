//! Alice and Bob as separate protocol participants.
//!
//! Each party keeps its secret bits in private fields; nothing in this
//! module hands one party a reference to the other's state. Information
//! moves between them only as the public messages the rest of the crate
//! defines, which keeps the public/private boundary checkable by
//! construction.

use rand::Rng;

use crate::states::{Basis, Measurement, Qubit};

fn parity_at(key: &[bool], positions: &[usize]) -> bool {
    positions.iter().fold(false, |acc, &p| acc ^ key[p])
}

fn discard_positions(key: &mut Vec<bool>, positions: &[usize]) {
    let mut drop = vec![false; key.len()];
    for &p in positions {
        drop[p] = true;
    }
    let mut index = 0;
    key.retain(|_| {
        let keep = !drop[index];
        index += 1;
        keep
    });
}

/// The sending party: generates random bits and bases, prepares qubits.
#[derive(Debug)]
pub struct Alice {
    bits: Vec<bool>,
    bases: Vec<Basis>,
    key: Vec<bool>,
}

impl Alice {
    /// Draw `n` random (bit, basis) pairs and the qubits encoding them.
    pub fn prepare<R: Rng>(n: usize, rng: &mut R) -> (Self, Vec<Qubit>) {
        let bits: Vec<bool> = (0..n).map(|_| rng.gen()).collect();
        let bases: Vec<Basis> = (0..n).map(|_| Basis::random(rng)).collect();
        let qubits = bits
            .iter()
            .zip(&bases)
            .map(|(&bit, &basis)| Qubit::prepare(bit, basis))
            .collect();
        let alice = Alice {
            bits,
            bases,
            key: Vec::new(),
        };
        (alice, qubits)
    }

    /// The public basis announcement.
    pub fn bases(&self) -> &[Basis] {
        &self.bases
    }

    /// Keep the bits at `indices` as the working sifted key.
    pub fn sift(&mut self, indices: &[usize]) {
        self.key = indices.iter().map(|&i| self.bits[i]).collect();
    }

    /// Publicly reveal the key bits at `positions`.
    pub fn reveal(&self, positions: &[usize]) -> Vec<bool> {
        positions.iter().map(|&p| self.key[p]).collect()
    }

    /// Drop `positions` from the working key; they are public now.
    pub fn discard(&mut self, positions: &[usize]) {
        discard_positions(&mut self.key, positions);
    }

    /// Parity of the key bits at `positions`.
    pub fn parity(&self, positions: &[usize]) -> bool {
        parity_at(&self.key, positions)
    }

    pub fn key(&self) -> &[bool] {
        &self.key
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    #[cfg(test)]
    pub(crate) fn from_key_bits(key: Vec<bool>) -> Self {
        Alice {
            bits: Vec::new(),
            bases: Vec::new(),
            key,
        }
    }
}

/// The receiving party: adopts the measurement outcomes from the channel's
/// far end and corrects its copy of the key during reconciliation.
#[derive(Debug)]
pub struct Bob {
    bits: Vec<bool>,
    bases: Vec<Basis>,
    key: Vec<bool>,
}

impl Bob {
    pub fn from_measurements(measurements: &[Measurement]) -> Self {
        Bob {
            bits: measurements.iter().map(|m| m.bit).collect(),
            bases: measurements.iter().map(|m| m.basis).collect(),
            key: Vec::new(),
        }
    }

    /// The public basis announcement.
    pub fn bases(&self) -> &[Basis] {
        &self.bases
    }

    /// Keep the bits at `indices` as the working sifted key.
    pub fn sift(&mut self, indices: &[usize]) {
        self.key = indices.iter().map(|&i| self.bits[i]).collect();
    }

    /// Publicly reveal the key bits at `positions`.
    pub fn reveal(&self, positions: &[usize]) -> Vec<bool> {
        positions.iter().map(|&p| self.key[p]).collect()
    }

    /// Drop `positions` from the working key; they are public now.
    pub fn discard(&mut self, positions: &[usize]) {
        discard_positions(&mut self.key, positions);
    }

    /// Parity of the key bits at `positions`.
    pub fn parity(&self, positions: &[usize]) -> bool {
        parity_at(&self.key, positions)
    }

    /// Flip one key bit, the endpoint of a Cascade bisection.
    pub fn flip(&mut self, position: usize) {
        self.key[position] = !self.key[position];
    }

    pub fn key(&self) -> &[bool] {
        &self.key
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    #[cfg(test)]
    pub(crate) fn from_key_bits(key: Vec<bool>) -> Self {
        Bob {
            bits: Vec::new(),
            bases: Vec::new(),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn prepared_qubits_encode_private_data() {
        let mut rng = ChaCha20Rng::seed_from_u64(20);
        let (alice, qubits) = Alice::prepare(64, &mut rng);
        assert_eq!(qubits.len(), 64);
        for (qubit, &basis) in qubits.iter().zip(alice.bases()) {
            assert_eq!(qubit.basis, basis);
        }
    }

    #[test]
    fn sift_selects_indices_in_order() {
        let mut bob = Bob::from_measurements(&[
            Measurement { bit: true, basis: Basis::Rectilinear },
            Measurement { bit: false, basis: Basis::Diagonal },
            Measurement { bit: true, basis: Basis::Diagonal },
            Measurement { bit: false, basis: Basis::Rectilinear },
        ]);
        bob.sift(&[0, 2, 3]);
        assert_eq!(bob.key(), &[true, true, false]);
    }

    #[test]
    fn discard_removes_exactly_the_given_positions() {
        let mut alice = Alice::from_key_bits(vec![true, false, true, true, false, false]);
        alice.discard(&[4, 1]);
        assert_eq!(alice.key(), &[true, true, true, false]);
    }

    #[test]
    fn parity_is_xor_over_positions() {
        let bob = Bob::from_key_bits(vec![true, true, false, true]);
        assert!(!bob.parity(&[0, 1]));
        assert!(bob.parity(&[0, 1, 3]));
        assert!(!bob.parity(&[]));
    }

    #[test]
    fn flip_toggles_one_bit() {
        let mut bob = Bob::from_key_bits(vec![false, false]);
        bob.flip(1);
        assert_eq!(bob.key(), &[false, true]);
    }
}
