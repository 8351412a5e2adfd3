// src/utils/crypto.rs
//! Cryptographic utilities for credential signing and verification.
//!
//! Uses SHA-256 and HMAC-SHA256 (via `ring`) for all operations:
//! - Content hashing of canonical credential JSON
//! - Keyed signatures binding identity fields to a timestamp
//! - Constant-time verification of inbound webhook signatures
//! - API key hashing for tenant lookup

use ring::{digest, hmac};

/// Computes the SHA-256 digest of `data` as a lowercase hex string.
///
/// # Arguments
/// * `data` - Binary data to hash
///
/// # Returns
/// 64-character lowercase hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest::digest(&digest::SHA256, data))
}

/// Computes `HMAC_SHA256(secret, payload)` as a lowercase hex string.
///
/// # Arguments
/// * `secret` - Symmetric signing key
/// * `payload` - Message bytes to authenticate
///
/// # Returns
/// 64-character lowercase hex signature.
pub fn hmac_sha256_hex(secret: &[u8], payload: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hex::encode(hmac::sign(&key, payload))
}

/// Verifies a hex-encoded HMAC-SHA256 signature in constant time.
///
/// # Arguments
/// * `secret` - Symmetric signing key
/// * `payload` - Message bytes the signature should cover
/// * `signature_hex` - Hex signature to check
///
/// # Returns
/// `true` only if the signature decodes and matches.
pub fn verify_hmac_hex(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let decoded = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hmac::verify(&key, payload, &decoded).is_ok()
}

/// Checks whether `value` has the shape of a SHA-256 hex digest:
/// exactly 64 lowercase hex characters.
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hmac_is_deterministic_for_fixed_inputs() {
        // Identity fields + timestamp bound exactly as the artifact signer does.
        let payload = b"ICT403:A. Claimant:B. Endorser:2024-01-01T00:00:00Z";
        let first = hmac_sha256_hex(b"fixed-secret", payload);
        let second = hmac_sha256_hex(b"fixed-secret", payload);
        assert_eq!(first, second);
        assert!(is_sha256_hex(&first));
    }

    #[test]
    fn test_hmac_changes_with_any_input() {
        let secret = b"fixed-secret";
        let base = hmac_sha256_hex(secret, b"ICT403:A. Claimant:B. Endorser:2024-01-01T00:00:00Z");
        let other_code =
            hmac_sha256_hex(secret, b"ICT404:A. Claimant:B. Endorser:2024-01-01T00:00:00Z");
        let other_claimant =
            hmac_sha256_hex(secret, b"ICT403:X. Claimant:B. Endorser:2024-01-01T00:00:00Z");
        let other_endorser =
            hmac_sha256_hex(secret, b"ICT403:A. Claimant:Y. Endorser:2024-01-01T00:00:00Z");
        assert_ne!(base, other_code);
        assert_ne!(base, other_claimant);
        assert_ne!(base, other_endorser);
    }

    #[test]
    fn test_verify_hmac_round_trip() {
        let sig = hmac_sha256_hex(b"secret", b"body");
        assert!(verify_hmac_hex(b"secret", b"body", &sig));
        assert!(!verify_hmac_hex(b"secret", b"other body", &sig));
        assert!(!verify_hmac_hex(b"wrong", b"body", &sig));
        assert!(!verify_hmac_hex(b"secret", b"body", "not-hex"));
    }

    #[test]
    fn test_sha256_hex_shape() {
        assert!(is_sha256_hex(&sha256_hex(b"anything")));
        assert!(!is_sha256_hex("abc123"));
        assert!(!is_sha256_hex(&"A".repeat(64)));
        assert!(!is_sha256_hex(&"g".repeat(64)));
    }
}
