//! Postgres-backed user store.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::{StoreError, User, UserLookup, UserStore};

/// User store over a sqlx connection pool.
///
/// Every statement runs inside a `db.query` span so traces show the exact
/// SQL alongside the surrounding request.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(
        &self,
        query: &str,
        statement: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Option<User>, StoreError> {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = statement
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Backend)?;
        Ok(row.map(user_from_row))
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, session_hash, reset_token_hash";

fn user_from_row(row: PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        session_hash: row.get("session_hash"),
        reset_token_hash: row.get("reset_token_hash"),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Map an update result to `NotFound` when no row matched the id.
fn require_row(result: sqlx::postgres::PgQueryResult) -> Result<(), StoreError> {
    if result.rows_affected() == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let query = "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(User {
                id: row.get("id"),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                session_hash: None,
                reset_token_hash: None,
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(err)),
        }
    }

    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        match lookup {
            UserLookup::ByEmail(email) => {
                let query = &format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
                self.fetch_one_by(query, sqlx::query(query).bind(email.to_string()))
                    .await
            }
            UserLookup::ById(id) => {
                let query = &format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
                self.fetch_one_by(query, sqlx::query(query).bind(id)).await
            }
            UserLookup::BySessionHash(hash) => {
                let query = &format!("SELECT {USER_COLUMNS} FROM users WHERE session_hash = $1");
                self.fetch_one_by(query, sqlx::query(query).bind(hash.to_vec()))
                    .await
            }
            UserLookup::ByResetTokenHash(hash) => {
                let query = &format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = $1");
                self.fetch_one_by(query, sqlx::query(query).bind(hash.to_vec()))
                    .await
            }
        }
    }

    async fn set_session_hash(
        &self,
        user_id: Uuid,
        session_hash: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let query = "UPDATE users SET session_hash = $2, updated_at = NOW() WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(session_hash.map(<[u8]>::to_vec))
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(result) => require_row(result),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(err)),
        }
    }

    async fn set_reset_token_hash(
        &self,
        user_id: Uuid,
        reset_token_hash: &[u8],
    ) -> Result<(), StoreError> {
        let query = "UPDATE users SET reset_token_hash = $2, updated_at = NOW() WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(reset_token_hash.to_vec())
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(result) => require_row(result),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(err)),
        }
    }

    async fn replace_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        // Clearing the reset token in the same statement keeps the token
        // single-use even when two updates race.
        let query = r"
            UPDATE users
            SET password_hash = $2,
                reset_token_hash = NULL,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(StoreError::Backend)?;
        require_row(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
