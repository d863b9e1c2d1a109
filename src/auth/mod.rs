//! Authentication engine: credential decoding, identity resolution, and the
//! session/password lifecycle.
//!
//! Two resolvers implement the same contract and are selected by
//! configuration: [`BasicAuthenticator`] verifies credentials embedded in the
//! Authorization header on every request, while [`SessionAuthenticator`]
//! resolves the opaque token presented in the session cookie. Both sit on top
//! of the user store; neither leaks whether an email exists.

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::fmt;
use uuid::Uuid;

use crate::store::{StoreError, User};

pub mod basic;
pub mod credentials;
pub mod password;
pub mod policy;
pub mod service;
pub mod session;
pub mod token;

pub use basic::BasicAuthenticator;
pub use password::PasswordHasher;
pub use service::SessionAuthService;
pub use session::SessionAuthenticator;

#[derive(Debug)]
pub enum AuthError {
    /// Registration targeted an email that already exists.
    DuplicateUser { email: String },
    /// A password-reset request named an unknown email.
    UserNotFound,
    /// A password update presented an unknown or already-consumed token.
    InvalidResetToken,
    /// The hashing primitive failed.
    Hash(anyhow::Error),
    /// The store failed; callers map this to a generic server failure.
    Store(StoreError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUser { email } => write!(f, "user {email} already exists"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::InvalidResetToken => write!(f, "invalid reset token"),
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
            Self::Store(err) => write!(f, "store operation failed: {err}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Authenticated user context derived per request; never persisted.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Resolve a request to a stored user, if its credentials check out.
///
/// The request abstraction is the header map; an absent request resolves to
/// no identity. The default implementation resolves nothing, so a resolver
/// only needs to override what it actually supports.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(
        &self,
        _request: Option<&HeaderMap>,
    ) -> Result<Option<User>, AuthError> {
        Ok(None)
    }
}

/// Which resolver guards non-exempt routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Basic,
    Session,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic" => Ok(Self::Basic),
            "session" => Ok(Self::Session),
            other => Err(format!("unknown auth mode: {other}")),
        }
    }
}

/// Process-wide authentication settings.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    mode: AuthMode,
    session_cookie_name: Option<String>,
    exempt_paths: Vec<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            session_cookie_name: None,
            exempt_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: Option<String>) -> Self {
        self.session_cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_exempt_paths(mut self, paths: Vec<String>) -> Self {
        self.exempt_paths = paths;
        self
    }

    #[must_use]
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> Option<&str> {
        self.session_cookie_name.as_deref()
    }

    #[must_use]
    pub fn exempt_paths(&self) -> &[String] {
        &self.exempt_paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;
    use std::sync::Arc;

    struct NullResolver;

    impl IdentityResolver for NullResolver {}

    #[tokio::test]
    async fn default_resolution_is_empty() {
        let resolver = NullResolver;
        let resolved = resolver.resolve_identity(None).await.unwrap();
        assert!(resolved.is_none());

        let resolved = resolver
            .resolve_identity(Some(&HeaderMap::new()))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn resolver_is_object_safe() {
        let _resolver: Arc<dyn IdentityResolver> = Arc::new(NullResolver);
        let _store: Arc<dyn crate::store::UserStore> = Arc::new(MemoryUserStore::new());
    }

    #[test]
    fn auth_mode_from_str() {
        assert_eq!("basic".parse::<AuthMode>().unwrap(), AuthMode::Basic);
        assert_eq!("session".parse::<AuthMode>().unwrap(), AuthMode::Session);
        assert!("digest".parse::<AuthMode>().is_err());
    }

    #[test]
    fn auth_config_builder() {
        let config = AuthConfig::new(AuthMode::Session)
            .with_session_cookie_name(Some("session_id".to_string()))
            .with_exempt_paths(vec!["/health".to_string()]);
        assert_eq!(config.mode(), AuthMode::Session);
        assert_eq!(config.session_cookie_name(), Some("session_id"));
        assert_eq!(config.exempt_paths(), ["/health".to_string()]);
    }

    #[test]
    fn auth_error_display() {
        let err = AuthError::DuplicateUser {
            email: "a@example.com".to_string(),
        };
        assert_eq!(err.to_string(), "user a@example.com already exists");
        assert_eq!(AuthError::UserNotFound.to_string(), "user not found");
        assert_eq!(
            AuthError::InvalidResetToken.to_string(),
            "invalid reset token"
        );
    }
}
