//! Project/software association repository.
//!
//! # Responsibility
//! - Link one project to one software version by natural keys.
//!
//! # Invariants
//! - Reference resolution, rule checks and the insert run in one immediate
//!   transaction; no other writer can delete a referenced row in between.
//! - Deprecated software versions are never linked.
//! - A project holds at most one major version of each non-deprecated
//!   software name.

use crate::model::association::ProjectSoftwareLink;
use crate::model::project::ProjectId;
use crate::model::software::major_version;
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::software_repo::{SoftwareRepository, SqliteSoftwareRepository};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Repository interface for association operations.
pub trait AssociationRepository {
    fn associate(
        &self,
        project_code: &str,
        software_name: &str,
        version: &str,
    ) -> RepoResult<ProjectSoftwareLink>;
}

/// SQLite-backed association repository.
pub struct SqliteAssociationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssociationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssociationRepository for SqliteAssociationRepository<'_> {
    fn associate(
        &self,
        project_code: &str,
        software_name: &str,
        version: &str,
    ) -> RepoResult<ProjectSoftwareLink> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let project_id: Option<ProjectId> = tx
            .query_row(
                "SELECT id FROM projects WHERE code = ?1;",
                [project_code],
                |row| row.get(0),
            )
            .optional()?;
        let Some(project_id) = project_id else {
            return Err(RepoError::NotFound(format!(
                "Project {project_code} not found"
            )));
        };

        let software =
            SqliteSoftwareRepository::new(&tx).get_software(software_name, version)?;

        if software.deprecated {
            return Err(RepoError::Rejected(
                "Cannot associate a deprecated software version".to_string(),
            ));
        }

        let already_linked: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM project_software
                WHERE project_id = ?1 AND software_id = ?2
            );",
            params![project_id, software.id],
            |row| row.get(0),
        )?;
        if already_linked == 1 {
            return Err(duplicate_link());
        }

        let existing_versions = {
            let mut stmt = tx.prepare(
                "SELECT s.version
                 FROM software s
                 INNER JOIN project_software ps ON ps.software_id = s.id
                 WHERE s.deprecated = 0
                   AND ps.project_id = ?1
                   AND s.name = ?2
                 ORDER BY ps.id ASC;",
            )?;
            let versions = stmt
                .query_map(params![project_id, software_name], |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            versions
        };
        let requested_major = software.major_version();
        if let Some(conflict) = existing_versions
            .iter()
            .find(|existing| major_version(existing) != requested_major)
        {
            return Err(RepoError::Rejected(format!(
                "Project already uses a different major version: {conflict}"
            )));
        }

        tx.execute(
            "INSERT INTO project_software (project_id, software_id) VALUES (?1, ?2);",
            params![project_id, software.id],
        )
        .map_err(|err| {
            map_write_error(
                err,
                || duplicate_link().to_string(),
                || format!("Project {project_code} or software {software_name} is missing"),
            )
        })?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(ProjectSoftwareLink {
            id,
            project_id,
            software_id: software.id,
        })
    }
}

fn duplicate_link() -> RepoError {
    RepoError::DuplicateKey("Software version already associated with the project".to_string())
}
