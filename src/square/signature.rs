//! Square webhook signature verification.
//!
//! Square signs each delivery with
//! `base64(HMAC-SHA256(signature_key, notification_url || raw_body))` and
//! sends the result in the `x-square-hmacsha256-signature` header. The raw
//! body must be the exact bytes received; re-serializing a parsed body breaks
//! the signature.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Returns true only when `signature` matches the expected digest. Malformed
/// or empty inputs are treated as "not verified"; this never panics.
pub fn verify(raw_body: &[u8], signature: &str, signature_key: &str, notification_url: &str) -> bool {
    if signature.is_empty() || signature_key.is_empty() || notification_url.is_empty() {
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(signature_key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(notification_url.as_bytes());
    mac.update(raw_body);
    let expected = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    // Constant-time comparison so timing does not leak the first mismatch.
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
