// src/kdf.rs
//! Master-password key derivation and verifier checking
//!
//! PBKDF2-HMAC-SHA256 turns the master password into the vault key.
//! A BLAKE3 keyed hash over the salt acts as the password verifier: it
//! lets an unlock attempt be rejected before any ciphertext is touched,
//! and it cannot be inverted to recover the key.

use rand::RngCore;
use sha2::Sha256;

use crate::aliases::VaultKey32;
use crate::consts::{
    DEFAULT_KDF_ITERATIONS, KEY_LEN, MIN_KDF_ITERATIONS, SALT_LEN, VERIFIER_CONTEXT,
};
use crate::error::VaultError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// Derive the 256-bit vault key from a password, salt, and iteration count.
///
/// Deterministic and side-effect free. Rejects salts that are not
/// [`SALT_LEN`] bytes and iteration counts below [`MIN_KDF_ITERATIONS`].
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<VaultKey32> {
    if salt.len() != SALT_LEN {
        return Err(VaultError::InvalidParameter("salt must be 32 bytes"));
    }
    if iterations < MIN_KDF_ITERATIONS {
        return Err(VaultError::InvalidParameter(
            "iterations below the 100000 floor",
        ));
    }
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    Ok(VaultKey32::new(key))
}

/// Generate a fresh random master-key salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Compute the password verifier: a BLAKE3 keyed hash of the salt plus a
/// fixed context string under the derived key.
pub fn make_verifier(key: &VaultKey32, salt: &[u8]) -> [u8; 32] {
    let mut input = Vec::with_capacity(salt.len() + VERIFIER_CONTEXT.len());
    input.extend_from_slice(salt);
    input.extend_from_slice(VERIFIER_CONTEXT);
    *blake3::keyed_hash(key.expose_secret(), &input).as_bytes()
}

/// Recompute the verifier for `password` and compare against the stored
/// one. `blake3::Hash` equality is constant time, so a mismatch does not
/// leak how close the candidate was.
pub fn check_password(
    password: &str,
    salt: &[u8],
    iterations: u32,
    verifier: &[u8; 32],
) -> Result<bool> {
    let key = derive_key(password, salt, iterations)?;
    let computed = blake3::Hash::from(make_verifier(&key, salt));
    Ok(computed == blake3::Hash::from(*verifier))
}

/// Derived key material for one vault.
///
/// `key` never touches disk; `salt`, `iterations`, and `verifier` are
/// persisted alongside the encrypted blob. Recreated wholesale on
/// password rotation.
pub struct MasterCredential {
    pub salt: [u8; SALT_LEN],
    pub iterations: u32,
    pub key: VaultKey32,
    pub verifier: [u8; 32],
}

impl MasterCredential {
    /// First-run setup or rotation: fresh salt, derived key, verifier.
    pub fn create(password: &str, iterations: u32) -> Result<Self> {
        let salt = generate_salt();
        let key = derive_key(password, &salt, iterations)?;
        let verifier = make_verifier(&key, &salt);
        Ok(Self {
            salt,
            iterations,
            key,
            verifier,
        })
    }

    /// Rebuild the credential from persisted parameters, verifying the
    /// password on the way.
    pub fn unlock(
        password: &str,
        salt: [u8; SALT_LEN],
        iterations: u32,
        verifier: [u8; 32],
    ) -> Result<Self> {
        if !check_password(password, &salt, iterations, &verifier)? {
            return Err(VaultError::Authentication);
        }
        let key = derive_key(password, &salt, iterations)?;
        Ok(Self {
            salt,
            iterations,
            key,
            verifier,
        })
    }

    pub fn default_iterations() -> u32 {
        DEFAULT_KDF_ITERATIONS
    }
}
