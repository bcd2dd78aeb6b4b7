//! Webhook signature verification.
//!
//! The platform signs each delivery with HMAC-SHA256 over the raw request
//! body and sends the hex digest in the signature header with a `sha256=`
//! prefix. Comparison is constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature header value for a payload.
///
/// HMAC accepts keys of any length, so the empty-string fallback is
/// unreachable in practice.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(payload);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature header against a payload.
///
/// Accepts the digest with or without the `sha256=` prefix. Any decoding
/// failure is a verification failure, never an error. An empty secret
/// rejects everything: HMAC over an empty key is computable by anyone, so
/// an unconfigured secret must not let signatures through.
pub fn verify_signature(secret: &str, payload: &[u8], provided: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let provided = provided.strip_prefix(SIGNATURE_PREFIX).unwrap_or(provided);
    let Ok(provided_bytes) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    expected.ct_eq(provided_bytes.as_slice()).into()
}
