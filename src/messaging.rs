//! Authenticated messaging on top of the distributed key.
//!
//! Thin consumer of the protocol's output, not part of the quantum exchange:
//! SHA-256 stretches the final key bits into an AES-256 key, and AES-GCM
//! seals and opens byte payloads with a fresh random nonce per message.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::MessagingError;

/// AES-GCM nonce width in bytes.
const NONCE_LEN: usize = 12;

/// A sealed payload: the nonce alongside ciphertext plus tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Pack key bits MSB-first into bytes, zero-padding the tail.
fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (index, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[index / 8] |= 1 << (7 - index % 8);
        }
    }
    bytes
}

/// Stretch the final key bits into a 256-bit cipher key.
pub fn derive_key(bits: &[bool]) -> Result<[u8; 32], MessagingError> {
    if bits.is_empty() {
        return Err(MessagingError::EmptyKey);
    }
    let mut hasher = Sha256::new();
    hasher.update(pack_bits(bits));
    Ok(hasher.finalize().into())
}

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn encrypt<R: RngCore + CryptoRng>(
    key: &[u8; 32],
    plaintext: &[u8],
    rng: &mut R,
) -> Result<SealedMessage, MessagingError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| MessagingError::Encryption)?;
    Ok(SealedMessage { nonce, ciphertext })
}

/// Open a sealed message, failing if the tag does not verify.
pub fn decrypt(key: &[u8; 32], message: &SealedMessage) -> Result<Vec<u8>, MessagingError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(&message.nonce), message.ciphertext.as_ref())
        .map_err(|_| MessagingError::Authentication)
}
