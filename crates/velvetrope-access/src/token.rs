//! Access token signing and verification.
//!
//! Tokens are HS256 JWTs with a fixed two-hour lifetime, stored in an
//! `httpOnly` cookie separate from the user session. Verification checks
//! three things, and absence or failure of any one of them means "no
//! access": the signature, the issuer string, and the expiry.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use velvetrope_core::{EdgeError, EdgeResult, SameSite, SetCookie};

use crate::claims::AccessClaims;

/// Issuer string embedded in every access token.
pub const ISSUER: &str = "prompt-party-access-protection";

/// Access token lifetime: two hours.
pub const TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";

/// Minimum length for the signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Signs and verifies sitewide access tokens.
///
/// # Example
///
/// ```
/// use velvetrope_access::AccessTokenSigner;
///
/// let signer = AccessTokenSigner::new("0123456789abcdef0123456789abcdef").unwrap();
/// let token = signer.issue().unwrap();
/// assert!(signer.is_valid(&token));
/// ```
pub struct AccessTokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material.
        f.debug_struct("AccessTokenSigner").finish_non_exhaustive()
    }
}

impl AccessTokenSigner {
    /// Creates a signer from the configured secret.
    ///
    /// # Errors
    ///
    /// Fails fast with a configuration error if the secret is shorter
    /// than [`MIN_SECRET_LEN`] characters. This is a deployment
    /// misconfiguration, not a per-request condition.
    pub fn new(secret: &str) -> EdgeResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(EdgeError::config(format!(
                "ACCESS_TOKEN_SECRET must be at least {MIN_SECRET_LEN} characters long"
            )));
        }

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issues a fresh access token valid for [`TOKEN_TTL_SECS`].
    pub fn issue(&self) -> EdgeResult<String> {
        self.issue_at(Utc::now())
    }

    /// Issues an access token with an explicit issue time.
    ///
    /// Exposed so tests can mint tokens that are already expired.
    pub fn issue_at(&self, now: DateTime<Utc>) -> EdgeResult<String> {
        let iat = now.timestamp();
        let claims = AccessClaims {
            granted: true,
            iat,
            exp: iat + TOKEN_TTL_SECS,
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| EdgeError::internal(format!("failed to sign access token: {e}")))
    }

    /// Verifies a token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns a token error when the signature is invalid, the issuer
    /// does not match, the token is expired, or the `granted` claim is
    /// not `true`. Callers treat any of these as "no access".
    pub fn verify(&self, token: &str) -> EdgeResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| EdgeError::token(e.to_string()))?;

        if !data.claims.granted {
            return Err(EdgeError::token("token does not carry a grant"));
        }

        Ok(data.claims)
    }

    /// Returns true if the token passes verification.
    ///
    /// Verification failures are logged as warnings, never propagated:
    /// an invalid token and a missing token behave identically.
    pub fn is_valid(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "access token verification failed");
                false
            }
        }
    }
}

/// Builds the `Set-Cookie` mutation carrying a freshly issued token.
///
/// The cookie is `httpOnly`, `SameSite=Lax`, scoped to `/`, expires with
/// the token, and is `Secure` in production deployments.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn access_cookie(token: impl Into<String>, production: bool) -> SetCookie {
    SetCookie::new(ACCESS_TOKEN_COOKIE, token)
        .max_age(TOKEN_TTL_SECS as u64)
        .http_only()
        .secure(production)
        .same_site(SameSite::Lax)
}
