//! Ordered schema steps tracked through `PRAGMA user_version`.
//!
//! Step SQL uses `IF NOT EXISTS`, so a registry created by an older
//! unversioned script is adopted rather than rebuilt.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// Schema steps; `SCHEMA_STEPS[n]` moves the database to version `n + 1`.
const SCHEMA_STEPS: &[&str] = &[include_str!("0001_init.sql")];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Upgrades `conn` to `latest_version()`.
///
/// The version is re-read under an immediate transaction so two processes
/// opening the same file never apply a step twice.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let target = latest_version();
    if schema_version(conn)? == target {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let found = schema_version(&tx)?;
    if found > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: target,
        });
    }

    for (version, sql) in (1..).zip(SCHEMA_STEPS.iter()).skip(found as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    if found < target {
        info!("event=db_migrate module=db status=ok from_version={found} to_version={target}");
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
