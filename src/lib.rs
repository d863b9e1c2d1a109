//! # Sesamo (Authentication & Session Service)
//!
//! `sesamo` issues and validates credentials for HTTP clients through two
//! complementary mechanisms:
//!
//! - **Basic authentication**: credentials ride along in the Authorization
//!   header and are decoded and verified on every request. Stateless.
//! - **Session authentication**: an opaque token is issued at login, carried
//!   in a cookie, and revoked at logout. Stateful, backed by the user store.
//!
//! It also covers the password lifecycle: registration with one-way bcrypt
//! hashing, login verification, and single-use reset-token password changes.
//!
//! ## Path Exclusion
//!
//! Routes are protected by default. Paths listed in the exclusion
//! configuration skip authentication entirely; a pattern ending in `*`
//! exempts every path sharing its prefix. An empty path and an empty
//! exclusion list both fall back to requiring authentication.
//!
//! ## Tokens
//!
//! Session and reset tokens are 32 bytes of OS randomness. Only SHA-256
//! hashes of them are persisted; the raw value is shown to the client once.
//! A user holds at most one session at a time (logging in again invalidates
//! the previous token) and a reset token is consumed by the same store
//! update that writes the new password hash.
//!
//! ## Account Probing
//!
//! Login and identity resolution never distinguish "unknown email" from
//! "wrong password"; both read as a plain authentication failure.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
