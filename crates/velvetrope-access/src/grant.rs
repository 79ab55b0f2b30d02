//! The access grant exchange: password in, cookie out.

use crate::password::verify_password;
use crate::token::{access_cookie, AccessTokenSigner};
use velvetrope_core::{EdgeResult, SetCookie};

/// Exchanges the gate password for an access-token cookie.
///
/// Returns `Ok(None)` when the password does not match
/// `expected_hash`; the caller answers 401 without learning anything
/// about the configured password. On a match, a fresh two-hour token
/// is issued and wrapped in its cookie.
///
/// # Errors
///
/// Propagates token signing failures.
pub fn grant(
    signer: &AccessTokenSigner,
    password: &str,
    expected_hash: &str,
    production: bool,
) -> EdgeResult<Option<SetCookie>> {
    if !verify_password(password, expected_hash) {
        tracing::info!("access grant denied");
        return Ok(None);
    }
    let token = signer.issue()?;
    tracing::info!("access grant issued");
    Ok(Some(access_cookie(token, production)))
}
