//! Privacy amplification via Toeplitz universal hashing.
//!
//! The corrected key is compressed to strip out what an observer of the
//! public exchange could know: the parity bits Cascade revealed plus a
//! margin covering Eve's possible interception, estimated from the QBER.
//! The hash family member is selected by a publicly exchanged seed; a
//! Toeplitz matrix over GF(2) is 2-universal, which is what makes the
//! leftover key statistically close to uniform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Bits subtracted from the corrected key on top of the Cascade leakage.
///
/// Intercept-resend at fraction f induces QBER ≈ f/4 on matched-basis
/// positions, so f is estimated as 4·qber; Eve guesses the right basis half
/// the time she taps, giving her half a bit per intercepted position. The
/// fixed safety term absorbs sampling error in the QBER estimate.
pub fn security_margin(qber: f64, len: usize, safety_bits: usize) -> usize {
    let intercepted_fraction = (4.0 * qber).min(1.0);
    (len as f64 * intercepted_fraction * 0.5).ceil() as usize + safety_bits
}

/// Length of the amplified key, or `None` when nothing would survive.
pub fn amplified_len(len: usize, qber: f64, leaked_bits: u64, safety_bits: usize) -> Option<usize> {
    let spent = leaked_bits as usize + security_margin(qber, len, safety_bits);
    if spent >= len {
        None
    } else {
        Some(len - spent)
    }
}

/// Compress `key` to `out_len` bits with the Toeplitz matrix drawn from the
/// publicly exchanged `seed`.
///
/// The matrix is fixed by `out_len + key.len() - 1` bits along its first
/// column and row; both parties derive the same matrix from the same seed,
/// so the same corrected key maps to the same final key on both sides.
pub fn toeplitz_compress(key: &[bool], out_len: usize, seed: u64) -> Vec<bool> {
    let n = key.len();
    if out_len == 0 || n == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let diagonals: Vec<bool> = (0..n + out_len - 1).map(|_| rng.gen()).collect();

    (0..out_len)
        .map(|row| {
            key.iter().enumerate().fold(false, |acc, (col, &bit)| {
                // Entry (row, col) lies on diagonal row - col, offset by
                // n - 1 to keep the index non-negative.
                acc ^ (bit & diagonals[row + n - 1 - col])
            })
        })
        .collect()
}
