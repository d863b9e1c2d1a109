//! Cookie-based session authentication.

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::{AuthError, IdentityResolver, policy, service::SessionAuthService};
use crate::store::User;

/// Resolves the configured session cookie to the user holding that session.
///
/// With no cookie name configured, every request resolves to no identity.
pub struct SessionAuthenticator {
    service: Arc<SessionAuthService>,
    cookie_name: Option<String>,
}

impl SessionAuthenticator {
    #[must_use]
    pub fn new(service: Arc<SessionAuthService>, cookie_name: Option<String>) -> Self {
        Self {
            service,
            cookie_name,
        }
    }
}

#[async_trait]
impl IdentityResolver for SessionAuthenticator {
    async fn resolve_identity(
        &self,
        request: Option<&HeaderMap>,
    ) -> Result<Option<User>, AuthError> {
        let Some(token) = policy::session_cookie(request, self.cookie_name.as_deref()) else {
            return Ok(None);
        };
        self.service.get_user_from_session(&token).await
    }
}
