//! Per-request Basic authentication.

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::{AuthError, IdentityResolver, credentials, password::PasswordHasher, policy};
use crate::store::{User, UserLookup, UserStore};

/// Resolves `Authorization: Basic` credentials to a stored user.
///
/// Pure read path: no state is created or mutated. Any malformed stage of
/// the pipeline, an unknown email, and a failed verification all resolve to
/// no identity, so callers cannot probe for account existence.
pub struct BasicAuthenticator {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl BasicAuthenticator {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }
}

#[async_trait]
impl IdentityResolver for BasicAuthenticator {
    async fn resolve_identity(
        &self,
        request: Option<&HeaderMap>,
    ) -> Result<Option<User>, AuthError> {
        let Some(header) = policy::authorization_header(request) else {
            return Ok(None);
        };
        let Some(payload) = credentials::strip_basic_prefix(&header) else {
            return Ok(None);
        };
        let Some(decoded) = credentials::decode(payload) else {
            return Ok(None);
        };
        let Some((email, password)) = credentials::split_credentials(&decoded) else {
            return Ok(None);
        };

        let Some(user) = self.store.find_user(UserLookup::ByEmail(email)).await? else {
            return Ok(None);
        };

        if self.hasher.verify(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn request_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn authenticator_with_user(email: &str, password: &str) -> BasicAuthenticator {
        let store = Arc::new(MemoryUserStore::new());
        let hasher = PasswordHasher::with_cost(4);
        let hash = hasher.hash(password).unwrap();
        store.create_user(email, &hash).await.unwrap();
        BasicAuthenticator::new(store, hasher)
    }

    #[tokio::test]
    async fn resolves_valid_credentials() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let header = format!("Basic {}", STANDARD.encode("alice@example.com:secret"));
        let headers = request_with_authorization(&header);

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.email).as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn wrong_password_resolves_empty() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let header = format!("Basic {}", STANDARD.encode("alice@example.com:wrong"));
        let headers = request_with_authorization(&header);

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn unknown_email_resolves_empty() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let header = format!("Basic {}", STANDARD.encode("bob@example.com:secret"));
        let headers = request_with_authorization(&header);

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn missing_prefix_resolves_empty() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let headers =
            request_with_authorization(&STANDARD.encode("alice@example.com:secret"));

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn invalid_base64_resolves_empty() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let headers = request_with_authorization("Basic not-base64!!!");

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn password_with_colons_survives_split() {
        let authenticator = authenticator_with_user("alice@example.com", "se:cr:et").await;
        let header = format!("Basic {}", STANDARD.encode("alice@example.com:se:cr:et"));
        let headers = request_with_authorization(&header);

        let user = authenticator
            .resolve_identity(Some(&headers))
            .await
            .unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn absent_request_resolves_empty() {
        let authenticator = authenticator_with_user("alice@example.com", "secret").await;
        let user = authenticator.resolve_identity(None).await.unwrap();
        assert!(user.is_none());
    }
}
