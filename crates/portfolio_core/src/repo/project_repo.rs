//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered/paginated listing over `projects`.
//! - Refuse to delete projects that still have software associations.
//!
//! # Invariants
//! - `code` uniqueness is enforced by the UNIQUE constraint, not by a
//!   read-before-write check, so racing creates cannot both succeed.
//! - Date filter bounds are inclusive; rows with NULL dates never match.
//! - `total` counts matching rows before pagination.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::{bool_to_int, read_flag, Page};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    code,
    archived,
    start_date,
    end_date
FROM projects";

static LIKE_WILDCARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\\%_]").expect("valid like wildcard regex"));

/// Conjunctive filters for project listing. `None` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Substring match on `code`; `%` and `_` are matched literally.
    pub code: Option<String>,
    pub archived: Option<bool>,
    /// Inclusive lower bound on `start_date`.
    pub start_date: Option<String>,
    /// Inclusive upper bound on `end_date`.
    pub end_date: Option<String>,
}

/// Filter plus 1-based pagination for project listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub filter: ProjectFilter,
    pub page: u32,
    pub size: u32,
}

impl Default for ProjectListQuery {
    fn default() -> Self {
        Self {
            filter: ProjectFilter::default(),
            page: 1,
            size: 10,
        }
    }
}

/// Repository interface for project operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId>;
    fn get_project_by_code(&self, code: &str) -> RepoResult<Project>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Page<Project>>;
    fn update_project(&self, code: &str, patch: &ProjectPatch) -> RepoResult<()>;
    fn delete_project(&self, code: &str) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn
            .execute(
                "INSERT INTO projects (code, archived, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    project.code.as_str(),
                    bool_to_int(project.archived),
                    project.start_date.as_deref(),
                    project.end_date.as_deref(),
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("Project with code {} already exists", project.code),
                    || format!("Project {} references a missing row", project.code),
                )
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_project_by_code(&self, code: &str) -> RepoResult<Project> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE code = ?1;"))?;
        let mut rows = stmt.query([code])?;
        if let Some(row) = rows.next()? {
            return parse_project_row(row);
        }

        Err(project_not_found(code))
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Page<Project>> {
        if query.page < 1 || query.size < 1 {
            return Err(RepoError::InvalidArgument(
                "Invalid page or size parameter. Must be positive integers.".to_string(),
            ));
        }

        let (where_sql, mut bind_values) = build_filter_clause(&query.filter);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM projects{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let offset = u64::from(query.page - 1) * u64::from(query.size);
        let offset = i64::try_from(offset).map_err(|_| {
            RepoError::InvalidArgument("page is too large for the given size".to_string())
        })?;
        bind_values.push(Value::Integer(i64::from(query.size)));
        bind_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}{where_sql} ORDER BY id ASC LIMIT ? OFFSET ?;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_row(row)?);
        }

        Ok(Page {
            items,
            total: total.max(0) as u64,
        })
    }

    fn update_project(&self, code: &str, patch: &ProjectPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Err(RepoError::InvalidArgument(
                "No valid fields to update".to_string(),
            ));
        }
        patch.validate()?;

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(archived) = patch.archived {
            assignments.push("archived = ?");
            bind_values.push(Value::Integer(bool_to_int(archived)));
        }
        if let Some(start_date) = patch.start_date.as_ref() {
            assignments.push("start_date = ?");
            bind_values.push(optional_text(start_date.as_deref()));
        }
        if let Some(end_date) = patch.end_date.as_ref() {
            assignments.push("end_date = ?");
            bind_values.push(optional_text(end_date.as_deref()));
        }
        bind_values.push(Value::Text(code.to_string()));

        let changed = self.conn.execute(
            &format!(
                "UPDATE projects SET {} WHERE code = ?;",
                assignments.join(", ")
            ),
            params_from_iter(bind_values),
        )?;

        if changed == 0 {
            return Err(project_not_found(code));
        }

        Ok(())
    }

    fn delete_project(&self, code: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let project_id: Option<ProjectId> = tx
            .query_row("SELECT id FROM projects WHERE code = ?1;", [code], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(project_id) = project_id else {
            return Err(project_not_found(code));
        };

        let associated: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM project_software WHERE project_id = ?1);",
            [project_id],
            |row| row.get(0),
        )?;
        if associated == 1 {
            return Err(project_in_use(code));
        }

        tx.execute("DELETE FROM projects WHERE id = ?1;", [project_id])?;
        tx.commit()?;
        Ok(())
    }
}

fn build_filter_clause(filter: &ProjectFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(code) = filter.code.as_deref() {
        sql.push_str(" AND code LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(format!("%{}%", escape_like(code))));
    }
    if let Some(archived) = filter.archived {
        sql.push_str(" AND archived = ?");
        bind_values.push(Value::Integer(bool_to_int(archived)));
    }
    if let Some(start_date) = filter.start_date.as_deref() {
        sql.push_str(" AND start_date >= ?");
        bind_values.push(Value::Text(start_date.to_string()));
    }
    if let Some(end_date) = filter.end_date.as_deref() {
        sql.push_str(" AND end_date <= ?");
        bind_values.push(Value::Text(end_date.to_string()));
    }

    (sql, bind_values)
}

fn escape_like(value: &str) -> String {
    LIKE_WILDCARD_RE.replace_all(value, r"\$0").into_owned()
}

fn optional_text(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        code: row.get("code")?,
        archived: read_flag(row, "projects", "archived")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    })
}

fn project_not_found(code: &str) -> RepoError {
    RepoError::NotFound(format!("Project {code} not found"))
}

fn project_in_use(code: &str) -> RepoError {
    RepoError::InUse(format!(
        "Cannot delete project {code}. It is associated with software."
    ))
}
