//! Repository Module
//!
//! Free-function data access over SQLite. Functions that must run inside a
//! caller's transaction take a `&mut SqliteConnection`; plain reads take the
//! pool.
//!
//! Money columns are cents (`*_cents`); rows convert into `shared::models`
//! with 2dp `Decimal` amounts.

// Catalog / customers
pub mod client;
pub mod food;

// Orders
pub mod amount;
pub mod order;
pub mod order_log;
pub mod procedures;

// Notifications
pub mod notification;

use shared::error::{AppError, ErrorCode};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut => {
                RepoError::Database("timed out waiting for a database connection".into())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Open a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before writing cannot upgrade its WAL
/// snapshot after another writer commits, and SQLite reports `SQLITE_BUSY`
/// without consulting `busy_timeout`. `BEGIN IMMEDIATE` queues on the busy
/// timeout instead, so concurrent writers serialize.
pub async fn begin_write(pool: &SqlitePool) -> RepoResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Convert a Decimal amount into cents, rejecting values that do not fit
pub(crate) fn cents(value: rust_decimal::Decimal, field: &str) -> RepoResult<i64> {
    crate::order_money::to_cents(value)
        .ok_or_else(|| RepoError::Validation(format!("{field} out of range: {value}")))
}

/// Stored quantities are positive INTEGERs
pub(crate) fn quantity(value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| RepoError::Database(format!("corrupt quantity: {value}")))
}
