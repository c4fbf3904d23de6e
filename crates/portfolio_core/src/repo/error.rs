//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Semantic and transport errors for registry persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Malformed or missing input (including pagination bounds).
    InvalidArgument(String),
    /// Unique-constraint violation on a natural key or link pair.
    DuplicateKey(String),
    /// Referenced entity is absent.
    NotFound(String),
    /// Entity is still referenced by an association.
    InUse(String),
    /// Write refused by a business rule (deprecated or conflicting version).
    Rejected(String),
    Db(DbError),
    /// Persisted row cannot be mapped to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "{message}"),
            Self::DuplicateKey(message) => write!(f, "{message}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::InUse(message) => write!(f, "{message}"),
            Self::Rejected(message) => write!(f, "{message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a failed write to `DuplicateKey`/`InUse` when SQLite reports the
/// matching constraint, passing every other failure through as `Db`.
pub(crate) fn map_write_error(
    err: rusqlite::Error,
    duplicate_message: impl FnOnce() -> String,
    in_use_message: impl FnOnce() -> String,
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return RepoError::DuplicateKey(duplicate_message());
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return RepoError::InUse(in_use_message());
                }
                _ => {}
            }
        }
    }
    err.into()
}
