//! HMAC-SHA256 validation for Shopify install requests and webhooks.
//!
//! Shopify signs install/callback requests by HMAC-ing the query string
//! (sorted, with the `hmac` parameter removed) and sends the hex digest in
//! the `hmac` parameter. Webhook bodies are signed the same way but the
//! digest arrives base64-encoded in the `X-Shopify-Hmac-SHA256` header.
//!
//! # Security
//!
//! All comparisons are constant-time to prevent timing attacks.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the request signature.
const HMAC_PARAM: &str = "hmac";

/// Computes an HMAC-SHA256 signature over a message, hex-encoded.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Computes an HMAC-SHA256 signature over raw bytes, base64-encoded.
///
/// Used for webhook verification, where Shopify signs the raw request body.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Builds the canonical signable string: `key=value` pairs joined with `&`,
/// sorted lexicographically by key, with the `hmac` parameter excluded.
fn to_signable_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, _)| key.as_str() != HMAC_PARAM)
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Verifies the signature of an install or callback request.
///
/// Returns `false` on any mismatch; mismatched input is never an error.
#[must_use]
pub fn verify_params(
    params: &BTreeMap<String, String>,
    claimed_signature: &str,
    secret: &str,
) -> bool {
    let computed = compute_signature(&to_signable_string(params), secret);
    constant_time_compare(&computed, claimed_signature)
}

/// Verifies the base64 signature of a webhook body.
#[must_use]
pub fn verify_webhook_body(body: &[u8], claimed_signature: &str, secret: &str) -> bool {
    let computed = compute_signature_base64(body, secret);
    constant_time_compare(&computed, claimed_signature)
}
