//! User record storage.
//!
//! The store is the only shared mutable resource in the service. It is
//! constructed once at startup and handed to the auth components; lookups go
//! through a closed set of keys and updates through typed per-field methods,
//! each a single atomic statement against the backend.

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// A stored identity record.
///
/// Raw session and reset tokens never reach the store; only their SHA-256
/// hashes are persisted, so a leaked record cannot be replayed as a cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub session_hash: Option<Vec<u8>>,
    pub reset_token_hash: Option<Vec<u8>>,
}

/// Supported single-field equality lookups.
#[derive(Clone, Copy, Debug)]
pub enum UserLookup<'a> {
    ByEmail(&'a str),
    ById(Uuid),
    BySessionHash(&'a [u8]),
    ByResetTokenHash(&'a [u8]),
}

#[derive(Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write (duplicate email, or a token
    /// hash already held by another record).
    Duplicate,
    /// An update targeted a record that does not exist.
    NotFound,
    /// The backend failed; surfaced to the caller as a generic failure.
    Backend(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "unique constraint violation"),
            Self::NotFound => write!(f, "record not found"),
            Self::Backend(err) => write!(f, "storage backend error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// CRUD surface over user records.
///
/// Object-safe so the service can hold `Arc<dyn UserStore>` and tests can
/// swap in the in-memory implementation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user with no session and no pending reset.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Single-record lookup; a miss is `Ok(None)`, never an error.
    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError>;

    /// Set or clear the active session hash in one statement.
    async fn set_session_hash(
        &self,
        user_id: Uuid,
        session_hash: Option<&[u8]>,
    ) -> Result<(), StoreError>;

    /// Record a pending password reset.
    async fn set_reset_token_hash(
        &self,
        user_id: Uuid,
        reset_token_hash: &[u8],
    ) -> Result<(), StoreError>;

    /// Replace the password hash and clear any pending reset token in the
    /// same statement, so a reset token can never be replayed.
    async fn replace_password(&self, user_id: Uuid, password_hash: &str)
        -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        assert_eq!(
            StoreError::Duplicate.to_string(),
            "unique constraint violation"
        );
        assert_eq!(StoreError::NotFound.to_string(), "record not found");
        assert!(
            StoreError::Backend(sqlx::Error::RowNotFound)
                .to_string()
                .starts_with("storage backend error")
        );
    }

    #[test]
    fn user_lookup_is_copy() {
        let lookup = UserLookup::ByEmail("a@example.com");
        let copied = lookup;
        assert!(matches!(copied, UserLookup::ByEmail("a@example.com")));
        assert!(matches!(lookup, UserLookup::ByEmail(_)));
    }
}
