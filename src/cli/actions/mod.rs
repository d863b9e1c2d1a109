use crate::auth::AuthMode;

pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        auth_mode: AuthMode,
        session_cookie_name: Option<String>,
        exempt_paths: Vec<String>,
    },
}
