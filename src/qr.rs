// src/qr.rs
//! QR payload transport for single profiles and encrypted backups
//!
//! Two payload shapes travel through QR codes: a bare `otpauth://` URI
//! for one profile, and an encrypted vault backup framed as
//! `OTPVAULT1:<base64 JSON blob>`. Decoding sniffs the shape rather
//! than trusting the caller; camera feeds hand over arbitrary strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::consts::{BACKUP_MAGIC, QR_MAX_PAYLOAD_BYTES};
use crate::crypto::EncryptedBlob;
use crate::error::VaultError;
use crate::kdf;
use crate::profile::Profile;
use crate::uri;

pub type Result<T> = std::result::Result<T, VaultError>;

/// What a scanned QR payload turned out to contain.
#[derive(Debug, Clone)]
pub enum ParsedImport {
    /// A single `otpauth://` profile, ready to add.
    PlainProfile(Profile),
    /// An encrypted vault backup; needs a password to open.
    EncryptedBackup(EncryptedBlob),
    /// Neither shape. Scanner loops skip these and keep polling.
    Unrecognized,
}

/// Render one profile as a QR payload (its `otpauth://` URI).
pub fn encode_profile(profile: &Profile) -> Result<String> {
    let payload = uri::serialize(profile);
    check_capacity(&payload)?;
    Ok(payload)
}

/// Frame an encrypted backup blob for QR transport.
pub fn encode_encrypted_backup(blob: &EncryptedBlob) -> Result<String> {
    let json = serde_json::to_vec(blob)?;
    let payload = format!("{BACKUP_MAGIC}{}", STANDARD.encode(json));
    check_capacity(&payload)?;
    Ok(payload)
}

/// Classify a scanned payload. Never errors on garbage input: anything
/// that parses as neither shape comes back as
/// [`ParsedImport::Unrecognized`], so scan loops can simply try again.
pub fn decode(payload: &str) -> ParsedImport {
    let payload = payload.trim();
    if let Ok(profile) = uri::parse(payload) {
        return ParsedImport::PlainProfile(profile);
    }
    if let Some(body) = payload.strip_prefix(BACKUP_MAGIC) {
        match decode_backup_body(body) {
            Ok(blob) => return ParsedImport::EncryptedBackup(blob),
            Err(e) => debug!("payload had backup magic but no valid blob: {e}"),
        }
    }
    ParsedImport::Unrecognized
}

/// Open a scanned backup with the master password it was sealed under
/// and recover its profile set.
pub fn decrypt_backup(blob: &EncryptedBlob, password: &str) -> Result<Vec<Profile>> {
    let key = kdf::derive_key(password, &blob.salt_bytes()?, blob.iterations)?;
    let plaintext = blob.open(&key)?;
    let profiles: Vec<Profile> =
        serde_json::from_slice(&plaintext).map_err(|_| VaultError::CorruptedVault)?;
    Ok(profiles)
}

fn decode_backup_body(body: &str) -> Result<EncryptedBlob> {
    let json = STANDARD
        .decode(body)
        .map_err(|_| VaultError::CorruptedVault)?;
    serde_json::from_slice(&json).map_err(|_| VaultError::CorruptedVault)
}

fn check_capacity(payload: &str) -> Result<()> {
    if payload.len() > QR_MAX_PAYLOAD_BYTES {
        return Err(VaultError::PayloadTooLarge {
            size: payload.len(),
            limit: QR_MAX_PAYLOAD_BYTES,
        });
    }
    Ok(())
}
