// src/uri.rs
//! `otpauth://` URI parsing and serialization per the Google
//! Authenticator key-URI format:
//! <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>
//!
//! Format: `otpauth://{totp|hotp}/{ISSUER:}LABEL?secret=BASE32&issuer=...
//! &algorithm=SHA1&digits=6&period=30` (`counter=` for HOTP).
//!
//! Parsing is strict about known parameters — an out-of-range `digits`
//! is an error, not a silently-applied default — and tolerant of unknown
//! ones, which are ignored for forward compatibility.

use url::Url;

use crate::error::VaultError;
use crate::otp::{self, Algorithm};
use crate::profile::{OtpKind, Profile};

pub type Result<T> = std::result::Result<T, VaultError>;

/// Parse an otpauth URI into a [`Profile`].
///
/// Call sites differ in how they treat the `Err` arm: explicit imports
/// surface the reason to the user, the passive clipboard poller just
/// discards it — most clipboard text is not an otpauth URI.
pub fn parse(uri: &str) -> Result<Profile> {
    let url = Url::parse(uri)
        .map_err(|e| VaultError::validation("uri", format!("not a valid URI: {e}")))?;

    if url.scheme() != "otpauth" {
        return Err(VaultError::validation(
            "uri",
            format!("expected scheme 'otpauth', got '{}'", url.scheme()),
        ));
    }

    let kind = match url.host_str() {
        Some("totp") => OtpKind::Totp,
        Some("hotp") => OtpKind::Hotp,
        other => {
            return Err(VaultError::validation(
                "uri",
                format!("unsupported OTP type: {other:?}"),
            ))
        }
    };

    // Path is "/LABEL" or "/ISSUER:LABEL"; percent-decoded before the split
    // candidates are inspected.
    let path = url.path().strip_prefix('/').unwrap_or(url.path());
    let path = percent_decode(path);
    let (path_issuer, label) = match path.split_once(':') {
        Some((issuer, label)) => (Some(issuer.trim().to_string()), label.trim().to_string()),
        None => (None, path.trim().to_string()),
    };
    if label.is_empty() {
        return Err(VaultError::validation("label", "missing account label"));
    }

    let mut secret = None;
    let mut param_issuer = None;
    let mut algorithm = Algorithm::default();
    let mut digits = crate::consts::DEFAULT_DIGITS;
    let mut period = crate::consts::DEFAULT_PERIOD;
    let mut counter = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret = Some(value.to_string()),
            "issuer" => param_issuer = Some(value.to_string()),
            "algorithm" => algorithm = Algorithm::parse(&value)?,
            "digits" => {
                let d: u32 = value
                    .parse()
                    .map_err(|_| VaultError::validation("digits", "not an integer"))?;
                otp::validate_digits(d)?;
                digits = d;
            }
            "period" => {
                let p: u64 = value
                    .parse()
                    .map_err(|_| VaultError::validation("period", "not an integer"))?;
                otp::validate_period(p)?;
                period = p;
            }
            "counter" => {
                let c: u64 = value
                    .parse()
                    .map_err(|_| VaultError::validation("counter", "not a non-negative integer"))?;
                counter = Some(c);
            }
            // Unknown parameters are ignored for forward compatibility.
            _ => {}
        }
    }

    let secret = secret.ok_or_else(|| VaultError::validation("secret", "missing parameter"))?;
    let secret = otp::decode_secret(&secret)?;

    if kind == OtpKind::Hotp && counter.is_none() {
        return Err(VaultError::validation(
            "counter",
            "required for hotp entries",
        ));
    }

    // Explicit issuer parameter wins over the label-derived prefix.
    let issuer = param_issuer.or(path_issuer).unwrap_or_default();

    let mut profile = Profile::new(label, secret)
        .with_issuer(issuer)
        .with_algorithm(algorithm)
        .with_digits(digits)
        .with_period(period);
    profile.kind = kind;
    // Retained even for TOTP entries so a foreign URI round-trips.
    profile.counter = counter.unwrap_or(0);
    Ok(profile)
}

/// Serialize a [`Profile`] back into an otpauth URI.
///
/// Always emits `secret`, `issuer`, `algorithm`, `digits`, and `period`
/// or `counter` depending on kind. The secret is re-encoded as unpadded
/// Base32 by convention.
pub fn serialize(profile: &Profile) -> String {
    let label = percent_encode(&profile.label);
    let path = if profile.issuer.is_empty() {
        label
    } else {
        format!("{}:{}", percent_encode(&profile.issuer), label)
    };

    let mut params = vec![
        format!("secret={}", otp::encode_secret(&profile.secret)),
        format!("issuer={}", percent_encode(&profile.issuer)),
        format!("algorithm={}", profile.algorithm.uri_name()),
        format!("digits={}", profile.digits),
    ];
    match profile.kind {
        OtpKind::Totp => params.push(format!("period={}", profile.period)),
        OtpKind::Hotp => params.push(format!("counter={}", profile.counter)),
    }

    format!("otpauth://{}/{}?{}", profile.kind, path, params.join("&"))
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next();
            let lo = bytes.next();
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    let hex = [hi, lo];
                    match u8::from_str_radix(std::str::from_utf8(&hex).unwrap_or(""), 16) {
                        Ok(decoded) => out.push(decoded),
                        Err(_) => {
                            out.push(b'%');
                            out.extend_from_slice(&hex);
                        }
                    }
                }
                _ => out.push(b'%'),
            }
        } else {
            out.push(b);
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_totp() {
        let uri = "otpauth://totp/Example:alice@example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example";
        let p = parse(uri).unwrap();
        assert_eq!(p.label, "alice@example.com");
        assert_eq!(p.issuer, "Example");
        assert_eq!(p.secret, otp::decode_secret("JBSWY3DPEHPK3PXP").unwrap());
        assert_eq!(p.kind, OtpKind::Totp);
        assert_eq!(p.algorithm, Algorithm::Sha1);
        assert_eq!(p.digits, 6);
        assert_eq!(p.period, 30);
    }

    #[test]
    fn parse_all_params() {
        let uri =
            "otpauth://totp/GitHub:user?secret=JBSWY3DPEHPK3PXP&algorithm=SHA256&digits=8&period=60";
        let p = parse(uri).unwrap();
        assert_eq!(p.algorithm, Algorithm::Sha256);
        assert_eq!(p.digits, 8);
        assert_eq!(p.period, 60);
        assert_eq!(p.issuer, "GitHub");
    }

    #[test]
    fn parse_hotp_requires_counter() {
        let p = parse("otpauth://hotp/Label?secret=JBSWY3DPEHPK3PXP&counter=42").unwrap();
        assert_eq!(p.kind, OtpKind::Hotp);
        assert_eq!(p.counter, 42);

        let err = parse("otpauth://hotp/Label?secret=JBSWY3DPEHPK3PXP");
        assert!(matches!(
            err,
            Err(VaultError::Validation { field: "counter", .. })
        ));
    }

    #[test]
    fn explicit_issuer_overrides_label_prefix() {
        let p = parse("otpauth://totp/Acme:user?secret=JBSWY3DPEHPK3PXP&issuer=AcmeCorp").unwrap();
        assert_eq!(p.issuer, "AcmeCorp");
        assert_eq!(p.label, "user");
    }

    #[test]
    fn issuer_from_label_prefix_only() {
        let p = parse("otpauth://totp/Acme:user@ex.com?secret=JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(p.issuer, "Acme");
        assert_eq!(p.label, "user@ex.com");
    }

    #[test]
    fn percent_decoded_label() {
        let p = parse("otpauth://totp/My%20Corp:my%20user?secret=JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(p.issuer, "My Corp");
        assert_eq!(p.label, "my user");
    }

    #[test]
    fn unknown_parameters_ignored() {
        let p = parse("otpauth://totp/a?secret=JBSWY3DPEHPK3PXP&image=http%3A%2F%2Fx&foo=1")
            .unwrap();
        assert_eq!(p.label, "a");
    }

    #[test]
    fn secret_is_case_insensitive_and_padding_tolerant() {
        let a = parse("otpauth://totp/a?secret=jbswy3dpehpk3pxp").unwrap();
        let b = parse("otpauth://totp/a?secret=JBSWY3DPEHPK3PXP%3D%3D").unwrap();
        assert_eq!(a.secret, b.secret);
    }

    #[test]
    fn error_mapping() {
        assert!(matches!(
            parse("otpauth://totp/a?issuer=X"),
            Err(VaultError::Validation { field: "secret", .. })
        ));
        assert!(matches!(
            parse("otpauth://totp/a?secret=JBSWY3DPEHPK3PXP&digits=11"),
            Err(VaultError::InvalidDigits(11))
        ));
        assert!(matches!(
            parse("otpauth://totp/a?secret=JBSWY3DPEHPK3PXP&period=0"),
            Err(VaultError::InvalidPeriod(0))
        ));
        assert!(matches!(
            parse("otpauth://totp/a?secret=JBSWY3DPEHPK3PXP&algorithm=SHA3"),
            Err(VaultError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            parse("otpauth://sms/a?secret=JBSWY3DPEHPK3PXP"),
            Err(VaultError::Validation { field: "uri", .. })
        ));
        assert!(matches!(
            parse("https://example.com"),
            Err(VaultError::Validation { field: "uri", .. })
        ));
        assert!(parse("not a uri at all").is_err());
        assert!(matches!(
            parse("otpauth://totp/?secret=JBSWY3DPEHPK3PXP"),
            Err(VaultError::Validation { field: "label", .. })
        ));
    }

    #[test]
    fn serialize_always_emits_known_params() {
        let p = Profile::new("alice", b"0123456789".to_vec()).with_issuer("Example");
        let uri = serialize(&p);
        assert!(uri.starts_with("otpauth://totp/Example:alice?"));
        assert!(uri.contains("secret="));
        assert!(uri.contains("issuer=Example"));
        assert!(uri.contains("algorithm=SHA1"));
        assert!(uri.contains("digits=6"));
        assert!(uri.contains("period=30"));
        assert!(!uri.contains("counter="));
    }

    #[test]
    fn serialize_hotp_emits_counter() {
        let p = Profile::new("bob", b"0123456789".to_vec()).as_hotp(99);
        let uri = serialize(&p);
        assert!(uri.starts_with("otpauth://hotp/"));
        assert!(uri.contains("counter=99"));
        assert!(!uri.contains("period="));
    }

    #[test]
    fn roundtrip_preserves_semantic_fields() {
        let cases = vec![
            Profile::new("alice@example.com", b"some secret!".to_vec())
                .with_issuer("My Corp")
                .with_algorithm(Algorithm::Sha512)
                .with_digits(8)
                .with_period(60),
            Profile::new("plain", b"k".to_vec()),
            Profile::new("counter based", b"hotp key".to_vec()).as_hotp(1234),
        ];
        for p in cases {
            let back = parse(&serialize(&p)).unwrap();
            assert!(back.same_credential(&p), "roundtrip broke {}", p.label);
            assert_eq!(back.display_name(), p.display_name());
        }
    }
}
