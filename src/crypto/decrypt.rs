// src/crypto/decrypt.rs
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::aliases::VaultKey32;
use crate::consts::NONCE_LEN;
use crate::error::VaultError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// Decrypt AES-256-GCM ciphertext → plaintext.
///
/// A tag mismatch means either the wrong key or a tampered blob; both
/// surface as the same [`VaultError::CorruptedVault`].
pub fn open(key: &VaultKey32, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
        .map_err(|_| VaultError::InvalidParameter("key must be 32 bytes"))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::CorruptedVault)
}
