// src/lib.rs
//! totp-vault — An encrypted TOTP/HOTP credential vault
//!
//! Features:
//! - RFC 4226 / RFC 6238 one-time-password generation and validation
//! - AES-256-GCM profile vault keyed by a PBKDF2-derived master password
//! - `otpauth://` URI parsing and serialization
//! - QR payload transport for single profiles and encrypted backups
//! - Full secure-gate integration for key material

pub mod aliases;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod error;
pub mod kdf;
pub mod otp;
pub mod profile;
pub mod qr;
pub mod uri;
pub mod vault;

// Re-export everything users need at the crate root
pub use aliases::{MasterPassword, SecureConversionsExt, SecureRandomExt, VaultKey32};
pub use config::load as load_config;
pub use crypto::EncryptedBlob;
pub use error::VaultError;
pub use otp::{generate_hotp, generate_totp, generate_totp_now, verify_hotp, Algorithm};
pub use profile::{OtpKind, Profile};
pub use qr::ParsedImport;
pub use vault::{CodeSnapshot, ResetConfirm, Result, VaultStore};
