//! Registration endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::valid_email;
use crate::auth::{AuthError, SessionAuthService};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub email: String,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = RegisterResponse),
        (status = 400, description = "Invalid payload or email already registered", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    service: Extension<Arc<SessionAuthService>>,
    payload: Option<Json<RegisterRequest>>,
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
    if !valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Invalid email".to_string(),
            }),
        )
            .into_response();
    }
    if request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Missing password".to_string(),
            }),
        )
            .into_response();
    }

    match service.register(&email, &request.password).await {
        Ok(user) => (
            StatusCode::OK,
            Json(RegisterResponse {
                email: user.email,
                message: "user created".to_string(),
            }),
        )
            .into_response(),
        Err(AuthError::DuplicateUser { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "email already registered".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Registration failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse {
                    message: "Registration failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}
