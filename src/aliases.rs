// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical key-material types used throughout totp-vault.
//! Everything here zeroizes on drop.

pub use secure_gate::{
    dynamic_alias, fixed_alias, SecureConversionsExt, SecureRandomExt,
};

// Fixed-size secrets
fixed_alias!(VaultKey32, 32); // 256-bit derived master key (AES-256-GCM)

// Dynamic secrets
dynamic_alias!(MasterPassword, String); // user-entered vault passphrase
dynamic_alias!(VaultPlaintext, Vec<u8>); // serialized profile set pre-seal
