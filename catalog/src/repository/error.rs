//! Storage Errors
//!
//! Errors reported by the SQLite repositories. Constraint failures are
//! classified so the service layer can turn a unique-index violation into
//! the same `AlreadyExists` error its own existence check produces.

use rusqlite::ffi;
use rusqlite::ErrorCode;

use crate::domain::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// A UNIQUE index or primary key rejected the write
    UniqueViolation(String),
    /// A foreign key rejected the write or delete
    ReferenceViolation(String),
    /// A row referenced by business key does not exist
    MissingReference(String),
    Sqlite(rusqlite::Error),
}

impl StoreError {
    /// Convert into a domain error, replacing a unique violation with an
    /// `AlreadyExists` carrying `message`.
    pub fn or_already_exists(self, message: impl FnOnce() -> String) -> DomainError {
        match self {
            StoreError::UniqueViolation(_) => DomainError::AlreadyExists(message()),
            other => other.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UniqueViolation(msg) => write!(f, "Unique constraint violated: {}", msg),
            StoreError::ReferenceViolation(msg) => write!(f, "Foreign key violated: {}", msg),
            StoreError::MissingReference(msg) => write!(f, "Missing reference: {}", msg),
            StoreError::Sqlite(e) => write!(f, "SQLite error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        StoreError::UniqueViolation(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::ReferenceViolation(detail),
                    _ => StoreError::Sqlite(e),
                }
            }
            _ => StoreError::Sqlite(e),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(msg) => DomainError::AlreadyExists(msg),
            StoreError::ReferenceViolation(msg) => DomainError::InvalidInput(msg),
            StoreError::MissingReference(msg) => DomainError::NotFound(msg),
            StoreError::Sqlite(e) => DomainError::Internal(e.to_string()),
        }
    }
}
