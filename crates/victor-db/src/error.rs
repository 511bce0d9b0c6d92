//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error / MigrateError / CoreError                                │
//! │       │                                                                 │
//! │       ▼  From impls (this file)                                         │
//! │  DbError                                                                │
//! │       │                                                                 │
//! │       ├──► ApiError (server)     NotFound → 404, else 500              │
//! │       └──► RelayError (relay)    sent to the origin as `error`         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use victor_core::CoreError;

/// Everything a repository call can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id.
    ///
    /// Raised by `ThreatRepository::update` for unknown ids and when a
    /// singleton row vanishes between its insert and the read-back.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A primary key or unique index already holds the value.
    #[error("Already exists: {0}")]
    UniqueViolation(String),

    /// A CHECK rejected the row (enum column, confidence range).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The pool could not open the SQLite file, or has been closed.
    #[error("Cannot reach database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for any other reason.
    #[error("Statement failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("No free database connection")]
    PoolExhausted,

    /// A stored row could not be turned back into a domain record.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Unexpected database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Sorts a SQLite error message by the constraint it names.
///
/// SQLite phrases these as `<KIND> constraint failed: <detail>`.
fn classify_sqlite_message(message: &str) -> DbError {
    const UNIQUE: &str = "UNIQUE constraint failed: ";
    const CHECK: &str = "CHECK constraint failed";

    if let Some((_, target)) = message.split_once(UNIQUE) {
        DbError::UniqueViolation(target.to_string())
    } else if message.contains(CHECK) {
        DbError::ConstraintViolation(message.to_string())
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

/// ```text
/// RowNotFound               → NotFound
/// Database(..)              → UniqueViolation | ConstraintViolation | QueryFailed
/// PoolTimedOut              → PoolExhausted
/// PoolClosed                → ConnectionFailed
/// ColumnDecode | Decode     → Corrupt
/// anything else             → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => classify_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Corrupt(err.to_string())
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Core errors only surface here while encoding a row, so they mean the
/// row itself is bad.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        DbError::Corrupt(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
