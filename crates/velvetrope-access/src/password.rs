//! Sitewide password verification.
//!
//! The gate password is never stored: deployments configure
//! `ACCESS_PASSWORD_HASH` as the SHA-256 hex digest of the password, and
//! the access-entry endpoint compares digests. On success it issues an
//! access token; the middleware only ever sees the token.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 hex digest of a password.
///
/// This is what operators put into `ACCESS_PASSWORD_HASH`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

/// Returns true if `password` hashes to `expected_hash`.
///
/// The comparison is digest-to-digest; the configured hash is
/// case-normalized so an upper-case digest from an external tool still
/// matches.
#[must_use]
pub fn verify_password(password: &str, expected_hash: &str) -> bool {
    hash_password(password) == expected_hash.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha256("party"), fixed vector so a digest change is caught.
        assert_eq!(
            hash_password("party"),
            "1d0fea39ec33ff7543f345be85d1ccd34d6d864297d4151b737802cb294a338c"
        );
    }

    #[test]
    fn test_verify_roundtrip() {
        let hash = hash_password("open sesame");
        assert!(verify_password("open sesame", &hash));
        assert!(!verify_password("open sesam", &hash));
    }

    #[test]
    fn test_verify_uppercase_hash() {
        let hash = hash_password("open sesame").to_uppercase();
        assert!(verify_password("open sesame", &hash));
    }

    #[test]
    fn test_empty_password_still_hashes() {
        let hash = hash_password("");
        assert_eq!(hash.len(), 64);
        assert!(verify_password("", &hash));
    }
}
