//! Password-reset endpoints: token issuance and consumption.

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

use crate::auth::{AuthError, SessionAuthService};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetResponse {
    pub email: String,
    pub reset_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdatePasswordRequest {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdatePasswordResponse {
    pub email: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/reset_password",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Reset token issued", body = ResetResponse),
        (status = 403, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn request_reset(
    service: Extension<Arc<SessionAuthService>>,
    payload: Option<Json<ResetRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let email = request.email.trim().to_string();
    match service.request_password_reset(&email).await {
        Ok(reset_token) => (
            StatusCode::OK,
            Json(ResetResponse { email, reset_token }),
        )
            .into_response(),
        Err(AuthError::UserNotFound) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => {
            error!("Reset token issuance failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/reset_password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UpdatePasswordResponse),
        (status = 403, description = "Invalid or consumed reset token")
    ),
    tag = "auth"
)]
pub async fn update_password(
    service: Extension<Arc<SessionAuthService>>,
    payload: Option<Json<UpdatePasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match service
        .update_password(&request.reset_token, &request.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(UpdatePasswordResponse {
                email: request.email.trim().to_string(),
                message: "Password updated".to_string(),
            }),
        )
            .into_response(),
        Err(AuthError::InvalidResetToken) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => {
            error!("Password update failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
