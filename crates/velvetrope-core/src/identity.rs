//! Caller identity for one request.
//!
//! The session refresher resolves the incoming cookies to an [`Identity`]
//! once per request; later stages (the route guard in particular) only
//! ever ask "is there a valid user, and who". The identity carries no
//! credentials; the auth provider's session cookies stay opaque in the
//! cookie jar.

use uuid::Uuid;

/// A logged-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// The provider-assigned user id.
    pub id: Uuid,
    /// The user's email address, when the provider reports one.
    pub email: Option<String>,
}

impl SessionUser {
    /// Creates a session user with the given id and no email.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self { id, email: None }
    }

    /// Creates a session user with an email address.
    pub fn with_email(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: Some(email.into()),
        }
    }
}

/// The resolved identity of the caller for the duration of one request.
///
/// # Example
///
/// ```
/// use velvetrope_core::{Identity, SessionUser};
/// use uuid::Uuid;
///
/// let identity = Identity::User(SessionUser::new(Uuid::new_v4()));
/// assert!(identity.is_authenticated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No valid session. Also the recovery value when the auth provider
    /// fails: absence of a valid session is never an error.
    #[default]
    Anonymous,
    /// A valid, possibly freshly refreshed, user session.
    User(SessionUser),
}

impl Identity {
    /// Returns the session user, if the caller is authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    /// Returns true if the caller has a valid session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never includes sensitive material; the format is `user:<id>` or
    /// `anonymous`.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::User(user) => format!("user:{}", user.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_anonymous() {
        let identity = Identity::default();
        assert!(!identity.is_authenticated());
        assert!(identity.user().is_none());
    }

    #[test]
    fn test_user_identity() {
        let id = Uuid::new_v4();
        let identity = Identity::User(SessionUser::with_email(id, "alice@example.com"));

        assert!(identity.is_authenticated());
        let user = identity.user().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_log_id_never_contains_email() {
        let id = Uuid::new_v4();
        let identity = Identity::User(SessionUser::with_email(id, "alice@example.com"));
        let log_id = identity.log_id();

        assert_eq!(log_id, format!("user:{id}"));
        assert!(!log_id.contains("alice"));
    }

    #[test]
    fn test_anonymous_log_id() {
        assert_eq!(Identity::Anonymous.log_id(), "anonymous");
    }
}
