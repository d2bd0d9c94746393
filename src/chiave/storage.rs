//! Postgres-backed account storage.
//!
//! Implements the core's [`AccountStore`] seam over sqlx. Uniqueness of
//! email and username is enforced by the table constraints; SQLSTATE
//! 23505 surfaces as [`StoreError::Duplicate`] so concurrent duplicate
//! registrations fail cleanly instead of corrupting state.

use crate::auth::{Account, AccountStore, StoreError};
use anyhow::Context;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::Instrument;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, enabled, \
     verification_code, code_expires_at, code_issued_at, created_at";

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_optional(
        &self,
        query: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to fetch account")
            .map_err(StoreError::Backend)?;

        Ok(row.as_ref().map(account_from_row))
    }
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        enabled: row.get("enabled"),
        verification_code: row.get("verification_code"),
        code_expires_at: row.get("code_expires_at"),
        code_issued_at: row.get("code_issued_at"),
        created_at: row.get("created_at"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        self.fetch_optional(&query, email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1");
        self.fetch_optional(&query, username).await
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE verification_code = $1");
        self.fetch_optional(&query, code).await
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        // Single upsert keeps every lifecycle mutation atomic.
        let query = r"
            INSERT INTO accounts
                (id, username, email, password_hash, enabled,
                 verification_code, code_expires_at, code_issued_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                enabled = EXCLUDED.enabled,
                verification_code = EXCLUDED.verification_code,
                code_expires_at = EXCLUDED.code_expires_at,
                code_issued_at = EXCLUDED.code_issued_at,
                updated_at = NOW()
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.enabled)
            .bind(&account.verification_code)
            .bind(account.code_expires_at)
            .bind(account.code_issued_at)
            .bind(account.created_at)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to save account"),
            )),
        }
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
