use axum::{Json, response::IntoResponse};
use serde_json::json;

// axum handler for the welcome route
pub async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Bienvenue" }))
}
