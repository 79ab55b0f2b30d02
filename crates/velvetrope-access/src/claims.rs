//! Access token claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a sitewide access token.
///
/// The token is a short-lived assertion that the visitor passed the
/// sitewide password gate. It is deliberately distinct from any user
/// session: a visitor can hold a valid access token without being
/// logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Always `true` on issued tokens; verified on the way back in so a
    /// token for some other purpose signed with the same key cannot
    /// pass the gate.
    pub granted: bool,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiry timestamp (Unix seconds).
    pub exp: i64,
    /// Issuer string; must match [`crate::ISSUER`].
    pub iss: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip() {
        let claims = AccessClaims {
            granted: true,
            iat: 1_700_000_000,
            exp: 1_700_007_200,
            iss: "prompt-party-access-protection".to_string(),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""granted":true"#));
        let parsed: AccessClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, claims);
    }
}
