// src/crypto/mod.rs
//! Authenticated-encryption layer — AES-256-GCM sealing of the vault
//!
//! The [`EncryptedBlob`] envelope is self-describing: it embeds the salt
//! and iteration count, so a backup blob can be decrypted independent of
//! any live vault state. The GCM auth tag rides at the end of the
//! ciphertext, which is how the `aes-gcm` crate frames it.

mod decrypt;
mod encrypt;

pub use decrypt::open;
pub use encrypt::{generate_nonce, seal};

use serde::{Deserialize, Serialize};

use crate::aliases::VaultKey32;
use crate::consts::{NONCE_LEN, SALT_LEN, VAULT_FORMAT_VERSION};
use crate::error::VaultError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// At-rest / at-backup representation of an encrypted profile set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// Format version tag, for forward compatibility.
    pub version: u32,
    /// Hex-encoded master-key salt.
    pub salt: String,
    /// PBKDF2 iteration count used for the key this blob was sealed with.
    pub iterations: u32,
    /// Hex-encoded nonce, unique per encryption operation.
    pub nonce: String,
    /// Base64 AES-256-GCM output (ciphertext plus auth tag).
    pub ciphertext: String,
}

impl EncryptedBlob {
    /// Seal `plaintext` under `key`, generating a fresh nonce.
    pub fn seal(
        key: &VaultKey32,
        salt: &[u8; SALT_LEN],
        iterations: u32,
        plaintext: &[u8],
    ) -> Result<Self> {
        use base64::Engine;
        let nonce = generate_nonce();
        let ciphertext = seal(key, &nonce, plaintext)?;
        Ok(Self {
            version: VAULT_FORMAT_VERSION,
            salt: hex::encode(salt),
            iterations,
            nonce: hex::encode(nonce),
            ciphertext: base64::engine::general_purpose::STANDARD.encode(ciphertext),
        })
    }

    /// Open the blob with an already-derived key.
    ///
    /// Any framing defect or tag mismatch comes back as
    /// [`VaultError::CorruptedVault`]; this method never distinguishes
    /// the two for the caller's display path.
    pub fn open(&self, key: &VaultKey32) -> Result<Vec<u8>> {
        use base64::Engine;
        let nonce_bytes = hex::decode(&self.nonce).map_err(|_| VaultError::CorruptedVault)?;
        let nonce: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| VaultError::CorruptedVault)?;
        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(&self.ciphertext)
            .map_err(|_| VaultError::CorruptedVault)?;
        open(key, &nonce, &ciphertext)
    }

    /// Decoded salt bytes, or `CorruptedVault` if mangled.
    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        hex::decode(&self.salt)
            .ok()
            .and_then(|s| s.try_into().ok())
            .ok_or(VaultError::CorruptedVault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf;

    fn test_key() -> (VaultKey32, [u8; SALT_LEN]) {
        let salt = [42u8; SALT_LEN];
        let key = kdf::derive_key("blob test password", &salt, 100_000).unwrap();
        (key, salt)
    }

    #[test]
    fn seal_open_roundtrip() {
        let (key, salt) = test_key();
        let blob = EncryptedBlob::seal(&key, &salt, 100_000, b"profile json here").unwrap();
        assert_eq!(blob.version, VAULT_FORMAT_VERSION);
        assert_eq!(blob.open(&key).unwrap(), b"profile json here");
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let (key, salt) = test_key();
        let a = EncryptedBlob::seal(&key, &salt, 100_000, b"same").unwrap();
        let b = EncryptedBlob::seal(&key, &salt, 100_000, b"same").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_is_corrupted_vault() {
        let (key, salt) = test_key();
        let blob = EncryptedBlob::seal(&key, &salt, 100_000, b"data").unwrap();
        let other = kdf::derive_key("different password", &salt, 100_000).unwrap();
        assert!(matches!(blob.open(&other), Err(VaultError::CorruptedVault)));
    }

    #[test]
    fn tampered_ciphertext_fails_integrity() {
        let (key, salt) = test_key();
        let mut blob = EncryptedBlob::seal(&key, &salt, 100_000, b"data").unwrap();
        // Flip one character of the base64 body.
        let mut chars: Vec<char> = blob.ciphertext.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        blob.ciphertext = chars.into_iter().collect();
        assert!(matches!(blob.open(&key), Err(VaultError::CorruptedVault)));
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let (key, salt) = test_key();
        let blob = EncryptedBlob::seal(&key, &salt, 100_000, b"").unwrap();
        assert!(blob.open(&key).unwrap().is_empty());
    }
}
