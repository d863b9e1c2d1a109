use crate::api;
use crate::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            auth_mode,
            session_cookie_name,
            exempt_paths,
        } => {
            // Fail on a malformed DSN before touching the pool.
            Url::parse(&dsn).context("Invalid database connection string")?;

            let config = AuthConfig::new(auth_mode)
                .with_session_cookie_name(session_cookie_name)
                .with_exempt_paths(exempt_paths);

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}
