// src/otp.rs
//! Stateless OTP generation — RFC 4226 (HOTP) and RFC 6238 (TOTP)
//!
//! All functions are pure over explicit inputs; timestamps are parameters
//! so tests are deterministic. HOTP counter advancement is the caller's
//! job (see `VaultStore::hotp_advance`) — nothing here mutates state.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use md5::Md5;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::consts::{MAX_DIGITS, MIN_DIGITS};
use crate::error::VaultError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// Hash algorithm for the HMAC step.
///
/// Closed set, dispatched by `match` — no string-keyed lookup, no silent
/// fallback on unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
    Md5,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri_name())
    }
}

impl Algorithm {
    /// Parse a case-insensitive algorithm name as found in otpauth URIs.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SHA1" | "SHA-1" => Ok(Self::Sha1),
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            "MD5" => Ok(Self::Md5),
            other => Err(VaultError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Canonical name for otpauth URI parameters.
    pub fn uri_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Md5 => "MD5",
        }
    }
}

/// Reject digit counts outside [4, 10].
pub fn validate_digits(digits: u32) -> Result<()> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(VaultError::InvalidDigits(digits));
    }
    Ok(())
}

/// Reject a zero time step.
pub fn validate_period(period: u64) -> Result<()> {
    if period < 1 {
        return Err(VaultError::InvalidPeriod(period));
    }
    Ok(())
}

fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Vec<u8> {
    match algo {
        Algorithm::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Md5 => {
            let mut mac = Hmac::<Md5>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

/// Dynamic truncation per RFC 4226 §5.3: low 4 bits of the final byte
/// select an offset, 4 bytes there are masked to 31 bits and reduced
/// modulo 10^digits. The offset is clamped so the 4-byte window stays
/// inside the digest; RFC 4226 assumes a 20-byte SHA-1 digest, but an
/// HMAC-MD5 digest is only 16 bytes and offsets 13–15 would run past
/// the end.
fn truncate(hmac_result: &[u8], digits: u32) -> String {
    let offset = (hmac_result[hmac_result.len() - 1] & 0x0f) as usize;
    let offset = offset.min(hmac_result.len() - 4);
    let binary = ((hmac_result[offset] as u32 & 0x7f) << 24)
        | ((hmac_result[offset + 1] as u32) << 16)
        | ((hmac_result[offset + 2] as u32) << 8)
        | (hmac_result[offset + 3] as u32);
    let code = binary as u64 % 10u64.pow(digits);
    format!("{:0>width$}", code, width = digits as usize)
}

/// Generate an HOTP code from raw secret bytes.
pub fn generate_hotp(secret: &[u8], algorithm: Algorithm, digits: u32, counter: u64) -> Result<String> {
    validate_digits(digits)?;
    let mac = compute_hmac(secret, &counter.to_be_bytes(), algorithm);
    Ok(truncate(&mac, digits))
}

/// Generate a TOTP code for an explicit unix timestamp.
pub fn generate_totp(
    secret: &[u8],
    algorithm: Algorithm,
    digits: u32,
    period: u64,
    at_time: u64,
) -> Result<String> {
    validate_period(period)?;
    generate_hotp(secret, algorithm, digits, at_time / period)
}

/// Generate a TOTP code for the current wall-clock time.
pub fn generate_totp_now(
    secret: &[u8],
    algorithm: Algorithm,
    digits: u32,
    period: u64,
) -> Result<String> {
    generate_totp(secret, algorithm, digits, period, unix_now())
}

/// Seconds until the code for `at_time` expires. Display only.
pub fn seconds_remaining(period: u64, at_time: u64) -> Result<u64> {
    validate_period(period)?;
    Ok(period - (at_time % period))
}

/// Try counters `[counter, counter + look_ahead]` against a candidate
/// code; return the first match, or `None` if the drift exceeds the
/// window. The caller commits `matched + 1` as the new stored counter —
/// the standard HOTP resynchronization policy.
pub fn verify_hotp(
    secret: &[u8],
    algorithm: Algorithm,
    digits: u32,
    counter: u64,
    candidate: &str,
    look_ahead: u64,
) -> Result<Option<u64>> {
    validate_digits(digits)?;
    // Shape check first: not a digits-long decimal string, not a code.
    if candidate.len() != digits as usize || !candidate.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    for c in counter..=counter.saturating_add(look_ahead) {
        let generated = generate_hotp(secret, algorithm, digits, c)?;
        if constant_time_eq(generated.as_bytes(), candidate.as_bytes()) {
            return Ok(Some(c));
        }
    }
    Ok(None)
}

/// Decode a Base32 secret: case-insensitive, tolerant of spaces, dashes,
/// and missing padding. Rejects empty results.
pub fn decode_secret(b32: &str) -> Result<Vec<u8>> {
    let cleaned: String = b32
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '='))
        .collect::<String>()
        .to_uppercase();
    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &cleaned)
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| VaultError::validation("secret", "not a valid base32 secret"))
}

/// Encode raw secret bytes as unpadded uppercase Base32.
pub fn encode_secret(bytes: &[u8]) -> String {
    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, bytes)
}

/// Generate a random secret of `byte_length` bytes.
pub fn generate_secret(byte_length: usize) -> Vec<u8> {
    let mut buf = vec![0u8; byte_length];
    rand::rng().fill_bytes(&mut buf);
    buf
}

/// Current unix timestamp in seconds (UTC).
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Constant-time comparison so code verification cannot be timed.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
