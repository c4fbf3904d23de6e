//! Pooled storage handle shared by request handlers.
//!
//! # Responsibility
//! - Build the connection pool and migrate the schema once at construction.
//! - Hand out one pooled connection per repository operation.
//!
//! # Invariants
//! - Each pooled connection is configured by `configure_connection` before use.
//! - A `StoreConnection` returns to the pool when dropped.

use super::open::{configure_connection, ensure_parent_dir, log_open, prepare_schema};
use super::{DbError, DbResult};
use log::{debug, error};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::time::Instant;

/// Connection checked out of a `Store`; derefs to `rusqlite::Connection`.
pub type StoreConnection = PooledConnection<SqliteConnectionManager>;

const DEFAULT_POOL_SIZE: u32 = 8;

/// Storage handle owning the registry connection pool.
///
/// Constructed at startup and passed explicitly to whatever needs
/// persistence; there is no global connection state.
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

impl Store {
    /// Opens (creating if needed) a file-backed store with the default pool size.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with_pool_size(path, DEFAULT_POOL_SIZE)
    }

    /// Opens a file-backed store holding at most `max_size` connections.
    pub fn open_with_pool_size(path: impl AsRef<Path>, max_size: u32) -> DbResult<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();
        let result = ensure_parent_dir(path).and_then(|()| {
            let manager = SqliteConnectionManager::file(path)
                .with_init(|conn| configure_connection(conn));
            let pool = Pool::builder().max_size(max_size).build(manager)?;
            Self::migrated(pool, true)
        });
        log_open("pool", started_at, &result);
        result
    }

    /// Opens a private in-memory store. Used by tests and ephemeral runs.
    ///
    /// Every SQLite memory connection is its own database, so the pool keeps
    /// exactly one connection alive for the lifetime of the store.
    pub fn open_in_memory() -> DbResult<Self> {
        let started_at = Instant::now();
        let manager =
            SqliteConnectionManager::memory().with_init(|conn| configure_connection(conn));
        let result = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)
            .map_err(DbError::from)
            .and_then(|pool| Self::migrated(pool, false));
        log_open("memory_pool", started_at, &result);
        result
    }

    fn migrated(pool: Pool<SqliteConnectionManager>, wal: bool) -> DbResult<Self> {
        {
            let mut conn = pool.get()?;
            if wal {
                // WAL lets readers run while another connection writes.
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            }
            prepare_schema(&mut conn)?;
        }
        Ok(Self { pool })
    }

    /// Checks out a connection for one operation.
    ///
    /// # Errors
    /// - `DbError::Pool` when no connection frees up within the pool timeout.
    pub fn acquire(&self) -> DbResult<StoreConnection> {
        match self.pool.get() {
            Ok(conn) => {
                debug!("event=store_acquire module=db status=ok");
                Ok(conn)
            }
            Err(err) => {
                error!("event=store_acquire module=db status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Upper bound on simultaneously checked-out connections.
    pub fn max_size(&self) -> u32 {
        self.pool.max_size()
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Store")
            .field("max_size", &self.pool.max_size())
            .field("connections", &state.connections)
            .field("idle", &state.idle_connections)
            .finish()
    }
}
