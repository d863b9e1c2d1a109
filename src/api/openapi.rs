use utoipa::OpenApi;

use super::handlers::{health, profile, reset_password, sessions, users};

/// OpenAPI document for all documented routes.
///
/// `/` and the Swagger UI assets are intentionally not documented.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::register,
        sessions::login,
        sessions::logout,
        profile::profile,
        reset_password::request_reset,
        reset_password::update_password,
    ),
    tags(
        (name = "auth", description = "Registration, sessions, and password resets"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "auth"));
        assert!(tags.iter().any(|tag| tag.name == "health"));
        for path in ["/health", "/users", "/sessions", "/profile", "/reset_password"] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }
}
