//! Authenticated profile endpoint.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Identity;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid credentials")
    ),
    tag = "auth"
)]
pub async fn profile(identity: Extension<Identity>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ProfileResponse {
            email: identity.email.clone(),
        }),
    )
}
