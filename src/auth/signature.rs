//! Webhook signature verification using HMAC-SHA256.
//!
//! SCM providers sign webhook payloads using HMAC over the raw request body
//! with a shared secret, delivered as `<algorithm>=<hex>` in a header. The
//! header *name* differs per vendor, so a table of recognized names is tried;
//! the value format is the same everywhere.
//!
//! Verification uses constant-time comparison. Malformed input of any shape
//! is a verification failure, never a panic.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Recognized signature header names, in the order they are tried.
///
/// One vendor-neutral name plus the GitHub and Pagure conventions. Names are
/// stored normalized (lowercase, `-` separators); incoming header names are
/// normalized the same way before comparison because proxies and CGI layers
/// mangle punctuation.
pub const SIGNATURE_HEADERS: &[&str] = &[
    "x-obs-signature",
    "x-hub-signature-256",
    "x-pagure-signature-256",
];

/// Normalizes a header name for comparison: lowercase, with every run of
/// non-alphanumeric characters collapsed to a single `-`.
fn normalize_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// A `(header name, header value)` pair proposed as proof of authenticity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCandidate {
    /// The recognized (normalized) header name the value arrived under.
    pub header: &'static str,
    /// The raw header value, expected to be `<algorithm>=<hex>`.
    pub value: String,
}

/// Collects the signature candidates present on a request.
///
/// All recognized headers are returned in table order; the vendor conventions
/// are not mutually exclusive and a request may legitimately carry more than
/// one. Values that are not valid UTF-8 are skipped.
pub fn signature_candidates(headers: &HeaderMap) -> Vec<SignatureCandidate> {
    let mut candidates = Vec::new();
    for recognized in SIGNATURE_HEADERS {
        for (name, value) in headers.iter() {
            if normalize_header_name(name.as_str()) == *recognized {
                if let Ok(value) = value.to_str() {
                    candidates.push(SignatureCandidate {
                        header: recognized,
                        value: value.to_string(),
                    });
                }
            }
        }
    }
    candidates
}

/// Parses a signature header value (e.g., `sha256=abc123...`) into raw bytes.
///
/// Returns `None` for malformed values: missing or unrecognized algorithm
/// prefix, invalid hex. Unknown algorithms fail closed here so that a forged
/// `md5=...` value can never validate.
pub fn parse_signature_header(value: &str) -> Option<Vec<u8>> {
    let hex_sig = value.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload with the given secret.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a header value, `sha256=<hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a signature header value against the payload and secret.
///
/// Returns `true` only if the value parses and the HMAC matches. The
/// comparison is constant-time via the HMAC library; timing-attack resistance
/// is a hard requirement on this path.
pub fn verify_signature(payload: &[u8], signature_value: &str, secret: &[u8]) -> bool {
    let expected = match parse_signature_header(signature_value) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
