//! Authentication guard middleware.
//!
//! Every request first passes the path-exclusion check; exempt paths go
//! straight to their handler. Everything else must resolve to an identity
//! through the configured resolver, which is then attached to the request
//! extensions for handlers to consume.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::auth::{Identity, IdentityResolver, policy};

#[derive(Clone)]
pub struct GuardState {
    resolver: Arc<dyn IdentityResolver>,
    exempt_paths: Arc<Vec<String>>,
}

impl GuardState {
    #[must_use]
    pub fn new(resolver: Arc<dyn IdentityResolver>, exempt_paths: Vec<String>) -> Self {
        Self {
            resolver,
            exempt_paths: Arc::new(exempt_paths),
        }
    }
}

pub async fn require_identity(
    State(guard): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !policy::requires_auth(request.uri().path(), &guard.exempt_paths) {
        return Ok(next.run(request).await);
    }

    let resolved = guard
        .resolver
        .resolve_identity(Some(request.headers()))
        .await
        .map_err(|err| {
            error!("Identity resolution failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match resolved {
        Some(user) => {
            request.extensions_mut().insert(Identity::from(&user));
            Ok(next.run(request).await)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
