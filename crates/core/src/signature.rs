//! Webhook payload signature verification.
//!
//! The payment gateway signs every event delivery with a header of the form
//! `t=<unix-seconds>,v1=<hex-hmac>`, where the HMAC-SHA256 is computed over
//! `"{t}.{raw-body}"` with the endpoint's signing secret. Verification must
//! happen on the raw request bytes before any store mutation; a forged or
//! stale notification is rejected outright.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted age of a signed event, in seconds. Events timestamped
/// further in the past (or future) than this are treated as replays.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

/// A parsed `t=...,v1=...` signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp (seconds) the gateway attached when signing.
    pub timestamp: i64,
    /// Hex-encoded HMAC-SHA256 signatures. The gateway may send several
    /// `v1` entries during secret rotation; any one matching is enough.
    pub signatures: Vec<String>,
}

/// Parse the signature header into its timestamp and `v1` signatures.
pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => {
                timestamp = value.parse().ok();
            }
            (Some("v1"), Some(value)) => {
                signatures.push(value.to_string());
            }
            // Unknown schemes (e.g. v0) are ignored, not an error.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CoreError::Validation("Signature header missing timestamp".into())
    })?;
    if signatures.is_empty() {
        return Err(CoreError::Validation(
            "Signature header missing v1 signature".into(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

// ---------------------------------------------------------------------------
// Signing / verification
// ---------------------------------------------------------------------------

/// Compute the hex-encoded HMAC-SHA256 of `"{timestamp}.{payload}"`.
///
/// Exposed so tests (and any outbound delivery tooling) sign payloads the
/// same way the verifier checks them.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signed webhook payload.
///
/// Checks, in order: header shape, timestamp within `tolerance_secs` of
/// `now` (both directions), and at least one `v1` signature matching the
/// expected HMAC. The HMAC comparison is constant-time via
/// [`Mac::verify_slice`].
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: Timestamp,
    tolerance_secs: i64,
) -> Result<(), CoreError> {
    let parsed = parse_signature_header(header)?;

    let age = now.timestamp() - parsed.timestamp;
    if age.abs() > tolerance_secs {
        return Err(CoreError::Validation(format!(
            "Signature timestamp outside tolerance ({age}s)"
        )));
    }

    for candidate in &parsed.signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(CoreError::Validation(
        "No matching webhook signature".into(),
    ))
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string into bytes. Fails on odd length or non-hex chars.
    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
