//! Session and password lifecycle over the user store.

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{
    AuthError,
    password::PasswordHasher,
    token::{generate_token, hash_token},
};
use crate::store::{StoreError, User, UserLookup, UserStore};

/// How many fresh tokens to try when the store reports a hash collision.
const TOKEN_RETRIES: usize = 3;

/// Registration, login verification, session issuance/teardown, and the
/// reset-token password flow.
///
/// Holds the store it was constructed with; password hashing happens before
/// any store call so the CPU-bound work never overlaps a store operation.
pub struct SessionAuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl SessionAuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Create a user with a hashed password and no session.
    ///
    /// # Errors
    /// `AuthError::DuplicateUser` when the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let password_hash = self.hasher.hash(password).map_err(AuthError::Hash)?;
        match self.store.create_user(email, &password_hash).await {
            Ok(user) => Ok(user),
            Err(StoreError::Duplicate) => Err(AuthError::DuplicateUser {
                email: email.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Check a login attempt.
    ///
    /// Unknown emails and wrong passwords both read as `false`; the caller
    /// cannot tell them apart.
    pub async fn valid_login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let Some(user) = self.store.find_user(UserLookup::ByEmail(email)).await? else {
            return Ok(false);
        };
        Ok(self.hasher.verify(password, &user.password_hash))
    }

    /// Open a session for the user, returning the raw token.
    ///
    /// Any prior session is overwritten and thereby invalidated. Unknown
    /// emails yield `None`. The store only ever sees the token's hash; on a
    /// hash collision a fresh token is tried a bounded number of times.
    pub async fn create_session(&self, email: &str) -> Result<Option<String>, AuthError> {
        let Some(user) = self.store.find_user(UserLookup::ByEmail(email)).await? else {
            return Ok(None);
        };

        for _ in 0..TOKEN_RETRIES {
            let token = generate_token().map_err(AuthError::Hash)?;
            let token_hash = hash_token(&token);
            match self
                .store
                .set_session_hash(user.id, Some(&token_hash))
                .await
            {
                Ok(()) => return Ok(Some(token)),
                Err(StoreError::Duplicate) => {
                    debug!("session token hash collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AuthError::Store(StoreError::Duplicate))
    }

    /// Resolve a session token to its user; empty and unknown tokens yield
    /// `None`.
    pub async fn get_user_from_session(&self, token: &str) -> Result<Option<User>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }
        let token_hash = hash_token(token);
        Ok(self
            .store
            .find_user(UserLookup::BySessionHash(&token_hash))
            .await?)
    }

    /// Clear the user's session.
    ///
    /// Idempotent: an already-anonymous user, and an unknown user id, are
    /// both no-ops.
    pub async fn destroy_session(&self, user_id: Uuid) -> Result<(), AuthError> {
        match self.store.set_session_hash(user_id, None).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Issue a password-reset token for the user.
    ///
    /// The active session, if any, is left untouched.
    ///
    /// # Errors
    /// `AuthError::UserNotFound` when the email is unknown.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        let Some(user) = self.store.find_user(UserLookup::ByEmail(email)).await? else {
            return Err(AuthError::UserNotFound);
        };

        for _ in 0..TOKEN_RETRIES {
            let token = generate_token().map_err(AuthError::Hash)?;
            let token_hash = hash_token(&token);
            match self.store.set_reset_token_hash(user.id, &token_hash).await {
                Ok(()) => return Ok(token),
                Err(StoreError::Duplicate) => {
                    debug!("reset token hash collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AuthError::Store(StoreError::Duplicate))
    }

    /// Consume a reset token and set a new password.
    ///
    /// The token is cleared in the same store update that replaces the
    /// password hash, so it can be used exactly once.
    ///
    /// # Errors
    /// `AuthError::InvalidResetToken` when the token is unknown or already
    /// consumed.
    pub async fn update_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if reset_token.is_empty() {
            return Err(AuthError::InvalidResetToken);
        }
        let token_hash = hash_token(reset_token);
        let Some(user) = self
            .store
            .find_user(UserLookup::ByResetTokenHash(&token_hash))
            .await?
        else {
            return Err(AuthError::InvalidResetToken);
        };

        let password_hash = self.hasher.hash(new_password).map_err(AuthError::Hash)?;
        Ok(self.store.replace_password(user.id, &password_hash).await?)
    }
}
