use crate::{
    auth::{
        AuthConfig, AuthMode, BasicAuthenticator, IdentityResolver, PasswordHasher,
        SessionAuthService, SessionAuthenticator,
    },
    store::PgUserStore,
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod guard;
pub mod handlers;
mod openapi;

pub use openapi::openapi;

use handlers::{health, profile, reset_password, root, sessions, users};

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, auth_config: AuthConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    // The store is built once here and handed to the auth components; there
    // is no global handle.
    let store = Arc::new(PgUserStore::new(pool.clone()));
    let hasher = PasswordHasher::new();
    let service = Arc::new(SessionAuthService::new(store.clone(), hasher));

    let resolver: Arc<dyn IdentityResolver> = match auth_config.mode() {
        AuthMode::Basic => Arc::new(BasicAuthenticator::new(store, hasher)),
        AuthMode::Session => Arc::new(SessionAuthenticator::new(
            service.clone(),
            auth_config.session_cookie_name().map(str::to_string),
        )),
    };
    let guard_state = guard::GuardState::new(resolver, auth_config.exempt_paths().to_vec());
    let auth_config = Arc::new(auth_config);

    let app = Router::new()
        .route("/", get(root::index))
        .route("/health", get(health::health).options(health::health))
        .route("/users", post(users::register))
        .route("/sessions", post(sessions::login).delete(sessions::logout))
        .route("/profile", get(profile::profile))
        .route(
            "/reset_password",
            post(reset_password::request_reset).put(reset_password::update_password),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(service))
                .layer(Extension(auth_config))
                .layer(Extension(pool))
                .layer(middleware::from_fn_with_state(
                    guard_state,
                    guard::require_identity,
                )),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
