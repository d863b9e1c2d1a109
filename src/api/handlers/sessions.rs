//! Login and logout endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::users::MessageResponse;
use crate::auth::{AuthConfig, SessionAuthService, policy};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub email: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created, cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<SessionAuthService>>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Missing payload".to_string(),
            }),
        )
            .into_response();
    };

    let email = request.email.trim().to_string();
    match service.valid_login(&email, &request.password).await {
        Ok(true) => {}
        Ok(false) => return StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => {
            error!("Login verification failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let token = match service.create_session(&email).await {
        // The user vanished between verification and issuance; treat it the
        // same as bad credentials.
        Ok(None) => return StatusCode::UNAUTHORIZED.into_response(),
        Ok(Some(token)) => token,
        Err(err) => {
            error!("Session creation failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    if let Some(name) = config.session_cookie_name() {
        match session_cookie(name, &token) {
            Ok(cookie) => {
                response_headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => {
                error!("Failed to build session cookie: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (
        StatusCode::OK,
        response_headers,
        Json(LoginResponse {
            email,
            message: "logged in".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    delete,
    path = "/sessions",
    responses(
        (status = 303, description = "Session destroyed, cookie cleared, redirect to /"),
        (status = 403, description = "No valid session cookie")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<Arc<SessionAuthService>>,
    config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let Some(token) = policy::session_cookie(Some(&headers), config.session_cookie_name()) else {
        return StatusCode::FORBIDDEN.into_response();
    };

    let user = match service.get_user_from_session(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => return StatusCode::FORBIDDEN.into_response(),
        Err(err) => {
            error!("Session lookup failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Err(err) = service.destroy_session(user.id).await {
        error!("Failed to destroy session: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Always clear the cookie once the session record is gone.
    let mut response_headers = HeaderMap::new();
    if let Some(name) = config.session_cookie_name() {
        if let Ok(cookie) = clear_session_cookie(name) {
            response_headers.insert(SET_COOKIE, cookie);
        }
    }
    (response_headers, Redirect::to("/")).into_response()
}

/// Build an `HttpOnly` cookie carrying the session token.
fn session_cookie(cookie_name: &str, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

fn clear_session_cookie(cookie_name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}
