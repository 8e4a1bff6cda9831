// src/consts.rs
//! Shared constants — security parameters and defaults

/// Default PBKDF2-HMAC-SHA256 iteration count for the master key
// ~0.05–0.1s on modern hardware — floor mandated by the vault format
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Minimum accepted iteration count; lower values are rejected outright
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Master-key salt length in bytes
pub const SALT_LEN: usize = 32;

/// AES-256-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Current vault/backup format version
pub const VAULT_FORMAT_VERSION: u32 = 1;

/// Domain-separation context for the password verifier hash
pub const VERIFIER_CONTEXT: &[u8] = b"totp-vault/verifier/v1";

/// Default OTP code length
pub const DEFAULT_DIGITS: u32 = 6;

/// Accepted OTP code length range
pub const MIN_DIGITS: u32 = 4;
pub const MAX_DIGITS: u32 = 10;

/// Default TOTP time step in seconds
pub const DEFAULT_PERIOD: u64 = 30;

/// Default HOTP resynchronization look-ahead window
// kept small — every extra counter widens the guessing surface
pub const DEFAULT_HOTP_LOOKAHEAD: u64 = 3;

/// Magic prefix for the encrypted backup envelope
pub const BACKUP_MAGIC: &str = "OTPVAULT1:";

/// Maximum QR payload size: a version-40 QR code at error-correction
/// level L holds 2953 bytes of 8-bit data
pub const QR_MAX_PAYLOAD_BYTES: usize = 2953;
