//! Password hashing.

use anyhow::{Context, Result};

/// One-way password hasher over bcrypt.
///
/// The cost is configurable so tests can run with the bcrypt minimum while
/// production keeps the library default.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password; the output embeds its own salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("failed to hash password")
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A malformed stored hash reads as a mismatch rather than an error, so
    /// callers cannot distinguish it from a wrong password.
    #[must_use]
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        bcrypt::verify(password, password_hash).unwrap_or(false)
    }
}
