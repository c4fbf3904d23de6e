//! Software repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `software`, addressed by `(name, version)`.
//!
//! # Invariants
//! - `(name, version)` uniqueness is enforced by the store constraint.
//! - Versions of one name are listed in creation order.
//! - Associated software versions cannot be deleted.

use crate::model::software::{NewSoftware, Software, SoftwareId, SoftwarePatch};
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::{bool_to_int, read_flag, Page};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const SOFTWARE_SELECT_SQL: &str = "SELECT
    id,
    name,
    version,
    vendor,
    deprecated
FROM software";

/// Repository interface for software operations.
pub trait SoftwareRepository {
    fn create_software(&self, software: &NewSoftware) -> RepoResult<SoftwareId>;
    /// Returns every version registered under `name`; `NotFound` when none.
    fn list_software_by_name(&self, name: &str) -> RepoResult<Page<Software>>;
    fn get_software(&self, name: &str, version: &str) -> RepoResult<Software>;
    fn update_software(&self, name: &str, version: &str, patch: &SoftwarePatch)
        -> RepoResult<()>;
    fn delete_software(&self, name: &str, version: &str) -> RepoResult<()>;
}

/// SQLite-backed software repository.
pub struct SqliteSoftwareRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSoftwareRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SoftwareRepository for SqliteSoftwareRepository<'_> {
    fn create_software(&self, software: &NewSoftware) -> RepoResult<SoftwareId> {
        software.validate()?;

        self.conn
            .execute(
                "INSERT INTO software (name, version, vendor, deprecated)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    software.name.as_str(),
                    software.version.as_str(),
                    software.vendor.as_deref(),
                    bool_to_int(software.deprecated),
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || {
                        format!(
                            "Software: {} with version: {} already exists",
                            software.name, software.version
                        )
                    },
                    || format!("Software {} references a missing row", software.name),
                )
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_software_by_name(&self, name: &str) -> RepoResult<Page<Software>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SOFTWARE_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([name])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_software_row(row)?);
        }

        if items.is_empty() {
            return Err(RepoError::NotFound(format!("Software {name} not found")));
        }

        let total = items.len() as u64;
        Ok(Page { items, total })
    }

    fn get_software(&self, name: &str, version: &str) -> RepoResult<Software> {
        let mut stmt = self.conn.prepare(&format!(
            "{SOFTWARE_SELECT_SQL} WHERE name = ?1 AND version = ?2;"
        ))?;
        let mut rows = stmt.query(params![name, version])?;
        if let Some(row) = rows.next()? {
            return parse_software_row(row);
        }

        Err(software_not_found(name, version))
    }

    fn update_software(
        &self,
        name: &str,
        version: &str,
        patch: &SoftwarePatch,
    ) -> RepoResult<()> {
        if patch.is_empty() {
            return Err(RepoError::InvalidArgument(
                "No valid fields to update".to_string(),
            ));
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(vendor) = patch.vendor.as_ref() {
            assignments.push("vendor = ?");
            bind_values.push(match vendor {
                Some(text) => Value::Text(text.clone()),
                None => Value::Null,
            });
        }
        if let Some(deprecated) = patch.deprecated {
            assignments.push("deprecated = ?");
            bind_values.push(Value::Integer(bool_to_int(deprecated)));
        }
        bind_values.push(Value::Text(name.to_string()));
        bind_values.push(Value::Text(version.to_string()));

        let changed = self.conn.execute(
            &format!(
                "UPDATE software SET {} WHERE name = ? AND version = ?;",
                assignments.join(", ")
            ),
            params_from_iter(bind_values),
        )?;

        if changed == 0 {
            return Err(software_not_found(name, version));
        }

        Ok(())
    }

    fn delete_software(&self, name: &str, version: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let software_id: Option<SoftwareId> = tx
            .query_row(
                "SELECT id FROM software WHERE name = ?1 AND version = ?2;",
                params![name, version],
                |row| row.get(0),
            )
            .optional()?;
        let Some(software_id) = software_id else {
            return Err(software_not_found(name, version));
        };

        let associated: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM project_software WHERE software_id = ?1);",
            [software_id],
            |row| row.get(0),
        )?;
        if associated == 1 {
            return Err(RepoError::InUse(format!(
                "Cannot delete software {name} v{version}. It is associated with a project."
            )));
        }

        tx.execute("DELETE FROM software WHERE id = ?1;", [software_id])?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_software_row(row: &Row<'_>) -> RepoResult<Software> {
    Ok(Software {
        id: row.get("id")?,
        name: row.get("name")?,
        version: row.get("version")?,
        vendor: row.get("vendor")?,
        deprecated: read_flag(row, "software", "deprecated")?,
    })
}

fn software_not_found(name: &str, version: &str) -> RepoError {
    RepoError::NotFound(format!("Software {name} version {version} not found"))
}
