//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from service orchestration.
//! - Translate constraint violations into semantic errors.
//!
//! # Invariants
//! - Write paths validate drafts before SQL mutations.
//! - All SQL is parameter-bound; user text never reaches the statement.
//! - List queries are ordered by surrogate `id ASC` so pagination is stable.

pub mod association_repo;
pub mod error;
pub mod project_repo;
pub mod software_repo;

use error::{RepoError, RepoResult};
use rusqlite::Row;
use serde::Serialize;

/// One page of list results plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Reads a 0/1 flag column, rejecting any other persisted value.
pub(crate) fn read_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}
