// src/profile.rs
//! Profile data model — one authentication entry in the vault

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::consts::{DEFAULT_DIGITS, DEFAULT_PERIOD};
use crate::error::VaultError;
use crate::otp::{self, Algorithm};

/// Time-based or counter-based entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
    #[default]
    Totp,
    Hotp,
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totp => f.write_str("totp"),
            Self::Hotp => f.write_str("hotp"),
        }
    }
}

/// One authentication entry.
///
/// Exactly one of `period`/`counter` is semantically active depending on
/// `kind`; the inactive field is retained for round-trip fidelity.
/// The raw secret is zeroized when the profile is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Stable unique identifier, assigned at creation, never reused.
    pub id: String,
    pub label: String,
    /// Issuer display string; may be empty.
    #[serde(default)]
    pub issuer: String,
    /// Raw key bytes, serialized as unpadded Base32.
    #[serde(with = "base32_bytes")]
    pub secret: Vec<u8>,
    pub kind: OtpKind,
    #[serde(default)]
    pub algorithm: Algorithm,
    pub digits: u32,
    /// TOTP time step in seconds.
    pub period: u64,
    /// HOTP counter; advanced by the caller after each generated code.
    pub counter: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Minimal TOTP profile with defaults.
    pub fn new(label: impl Into<String>, secret: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            issuer: String::new(),
            secret,
            kind: OtpKind::Totp,
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            counter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }

    pub fn as_hotp(mut self, counter: u64) -> Self {
        self.kind = OtpKind::Hotp;
        self.counter = counter;
        self
    }

    /// "Issuer (label)" or just "label".
    pub fn display_name(&self) -> String {
        if self.issuer.is_empty() {
            self.label.clone()
        } else {
            format!("{} ({})", self.issuer, self.label)
        }
    }

    /// Field-range validation, applied on import and before store inserts.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.label.is_empty() {
            return Err(VaultError::validation("label", "must not be empty"));
        }
        if self.secret.is_empty() {
            return Err(VaultError::validation("secret", "must not be empty"));
        }
        otp::validate_digits(self.digits)?;
        if self.kind == OtpKind::Totp {
            otp::validate_period(self.period)?;
        }
        Ok(())
    }

    /// Semantic equality: every field that affects generated codes or
    /// display, ignoring `id` and timestamps.
    pub fn same_credential(&self, other: &Profile) -> bool {
        self.label == other.label
            && self.issuer == other.issuer
            && self.secret == other.secret
            && self.kind == other.kind
            && self.algorithm == other.algorithm
            && self.digits == other.digits
            && self.period == other.period
            && self.counter == other.counter
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Serde codec storing the raw secret as unpadded Base32 text.
mod base32_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::otp;

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&otp::encode_secret(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(de)?;
        otp::decode_secret(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rfc_conventions() {
        let p = Profile::new("alice@example.com", b"0123456789".to_vec());
        assert_eq!(p.kind, OtpKind::Totp);
        assert_eq!(p.algorithm, Algorithm::Sha1);
        assert_eq!(p.digits, 6);
        assert_eq!(p.period, 30);
        assert_eq!(p.counter, 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn serde_roundtrip_preserves_secret() {
        let p = Profile::new("bob", b"raw secret bytes".to_vec())
            .with_issuer("Example")
            .with_algorithm(Algorithm::Sha256)
            .with_digits(8);
        let json = serde_json::to_string(&p).unwrap();
        // Secret must never appear as raw bytes/hex in the JSON.
        assert!(json.contains(&otp::encode_secret(&p.secret)));
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert!(back.same_credential(&p));
        assert_eq!(back.id, p.id);
    }

    #[test]
    fn validation_catches_bad_fields() {
        let p = Profile::new("", b"x".to_vec());
        assert!(matches!(
            p.validate(),
            Err(VaultError::Validation { field: "label", .. })
        ));

        let p = Profile::new("ok", vec![]);
        assert!(matches!(
            p.validate(),
            Err(VaultError::Validation { field: "secret", .. })
        ));

        let p = Profile::new("ok", b"x".to_vec()).with_digits(11);
        assert!(matches!(p.validate(), Err(VaultError::InvalidDigits(11))));

        let p = Profile::new("ok", b"x".to_vec()).with_period(0);
        assert!(matches!(p.validate(), Err(VaultError::InvalidPeriod(0))));
    }

    #[test]
    fn hotp_profile_ignores_period_validation() {
        let p = Profile::new("ok", b"x".to_vec()).with_period(0).as_hotp(7);
        assert!(p.validate().is_ok());
        assert_eq!(p.counter, 7);
    }

    #[test]
    fn display_name_composition() {
        let p = Profile::new("alice", b"x".to_vec());
        assert_eq!(p.display_name(), "alice");
        let p = p.with_issuer("GitHub");
        assert_eq!(p.display_name(), "GitHub (alice)");
    }
}
