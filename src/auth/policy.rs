//! Request authentication policy: path exclusion and credential extraction.

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};

/// Decide whether a request path requires authentication.
///
/// A pattern ending in `*` matches any path sharing its prefix; any other
/// pattern matches after trimming a single trailing slash on both sides.
/// The default is deny: an empty path or an empty pattern list always
/// requires authentication.
#[must_use]
pub fn requires_auth(path: &str, excluded_paths: &[String]) -> bool {
    if path.is_empty() || excluded_paths.is_empty() {
        return true;
    }

    let normalized = trim_trailing_slash(path);
    for pattern in excluded_paths {
        if let Some(prefix) = pattern.strip_suffix('*') {
            if path.starts_with(prefix) || normalized.starts_with(prefix) {
                return false;
            }
        } else if normalized == trim_trailing_slash(pattern) {
            return false;
        }
    }

    true
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Raw value of the Authorization header, if the request carries one.
#[must_use]
pub fn authorization_header(request: Option<&HeaderMap>) -> Option<String> {
    let value = request?.get(AUTHORIZATION)?;
    value.to_str().ok().map(str::to_string)
}

/// Value of the configured session cookie.
///
/// Yields nothing when the request is absent, the cookie name is unset, or
/// the cookie is missing.
#[must_use]
pub fn session_cookie(request: Option<&HeaderMap>, cookie_name: Option<&str>) -> Option<String> {
    let headers = request?;
    let cookie_name = cookie_name?;
    let value = headers.get(COOKIE)?.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == cookie_name {
            return Some(val.to_string());
        }
    }
    None
}
