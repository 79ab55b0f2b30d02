//! # Velvetrope Access
//!
//! Sitewide access protection primitives.
//!
//! The Prompt Party deployment can be placed behind a single shared
//! password. The flow splits cleanly in two:
//!
//! 1. The access-entry endpoint validates the submitted password against
//!    `ACCESS_PASSWORD_HASH` ([`verify_password`]) and, on success,
//!    issues a signed two-hour token ([`AccessTokenSigner::issue`])
//!    delivered via an `httpOnly` cookie ([`access_cookie`]); [`grant`]
//!    wraps the whole exchange.
//! 2. The middleware access gate only verifies the token
//!    ([`AccessTokenSigner::is_valid`]): no password material, no
//!    server lookup.
//!
//! The token is deliberately not the user session; site access and login
//! are independent states.

#![doc(html_root_url = "https://docs.rs/velvetrope-access/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod claims;
mod grant;
mod password;
mod token;

pub use claims::AccessClaims;
pub use grant::grant;
pub use password::{hash_password, verify_password};
pub use token::{
    access_cookie, AccessTokenSigner, ACCESS_TOKEN_COOKIE, ISSUER, MIN_SECRET_LEN, TOKEN_TTL_SECS,
};
