// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    /// Wrong master password.
    ///
    /// Deliberately rendered with the same message as [`CorruptedVault`]
    /// so callers cannot (and UIs do not) reveal which check failed.
    ///
    /// [`CorruptedVault`]: VaultError::CorruptedVault
    #[error("invalid master password or corrupted vault")]
    Authentication,

    /// Authentication tag mismatch while opening the vault blob.
    #[error("invalid master password or corrupted vault")]
    CorruptedVault,

    /// Operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// Malformed otpauth parameter or profile field.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("digits must be between 4 and 10, got {0}")]
    InvalidDigits(u32),

    #[error("period must be at least 1 second, got {0}")]
    InvalidPeriod(u64),

    /// Out-of-contract key-derivation input (salt length, iteration floor).
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("payload of {size} bytes exceeds QR capacity of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl VaultError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        VaultError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
