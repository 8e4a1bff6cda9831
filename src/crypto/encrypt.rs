// src/crypto/encrypt.rs
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::aliases::VaultKey32;
use crate::consts::NONCE_LEN;
use crate::error::VaultError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// Generate a random 96-bit nonce. Never reused with the same key — the
/// caller seals each write with a fresh one.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt plaintext → AES-256-GCM ciphertext with appended auth tag.
pub fn seal(key: &VaultKey32, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
        .map_err(|_| VaultError::InvalidParameter("key must be 32 bytes"))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| VaultError::InvalidParameter("AES-GCM encryption failed"))
}
