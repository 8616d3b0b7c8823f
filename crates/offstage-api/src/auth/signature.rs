//! HMAC verification for encoding-worker callbacks.
//!
//! The worker signs the raw request body with the shared webhook secret and
//! sends the hex digest in `X-Encoder-Signature`. Verification runs against
//! the raw bytes, before any JSON parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SIGNATURE_HEADER: &str = "x-encoder-signature";

type HmacSha256 = Hmac<Sha256>;

/// Verify an HMAC-SHA256 hex signature over the raw body.
///
/// Comparison is on decoded bytes, in constant time. A header that is not
/// valid hex fails without touching the MAC.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(presented) = hex::decode(signature_hex) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    expected.as_slice().ct_eq(&presented).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef";

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_verifies() {
        let body = br#"{"jobId":"rp-42","status":"completed"}"#;
        let signature = sign(SECRET, body);
        assert!(verify_signature(SECRET, body, &signature));
    }

    #[test]
    fn test_uppercase_hex_verifies() {
        let body = b"payload";
        let signature = sign(SECRET, body).to_uppercase();
        assert!(verify_signature(SECRET, body, &signature));
    }

    #[test]
    fn test_tampered_body_fails() {
        let signature = sign(SECRET, b"original body");
        assert!(!verify_signature(SECRET, b"tampered body", &signature));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"payload";
        let signature = sign("another-secret-value", body);
        assert!(!verify_signature(SECRET, body, &signature));
    }

    #[test]
    fn test_non_hex_signature_fails() {
        assert!(!verify_signature(SECRET, b"payload", "not hex at all"));
        assert!(!verify_signature(SECRET, b"payload", ""));
    }
}
