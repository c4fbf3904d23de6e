//! Caller-facing error taxonomy for use-case services.

use crate::db::DbError;
use crate::mapper::MapError;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error; the HTTP surface maps each variant to one status code.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input.
    InvalidArgument(String),
    /// Natural key or link already exists.
    DuplicateKey(String),
    /// Referenced entity is absent.
    NotFound(String),
    /// Entity is still referenced and cannot be deleted.
    InUse(String),
    /// Business rule refused the write.
    Rejected(String),
    /// Storage failure; details are for logs, not for callers.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message)
            | Self::DuplicateKey(message)
            | Self::NotFound(message)
            | Self::InUse(message)
            | Self::Rejected(message) => write!(f, "{message}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            RepoError::DuplicateKey(message) => Self::DuplicateKey(message),
            RepoError::NotFound(message) => Self::NotFound(message),
            RepoError::InUse(message) => Self::InUse(message),
            RepoError::Rejected(message) => Self::Rejected(message),
            other @ (RepoError::Db(_) | RepoError::InvalidData(_)) => Self::Storage(other),
        }
    }
}

impl From<MapError> for ServiceError {
    fn from(value: MapError) -> Self {
        Self::InvalidArgument(value.0)
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl ServiceError {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::InUse(_) => "in_use",
            Self::Rejected(_) => "rejected",
            Self::Storage(_) => "storage",
        }
    }
}
