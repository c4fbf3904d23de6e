//! Project use-case service.
//!
//! # Responsibility
//! - Map raw project payloads and query strings into typed inputs.
//! - Delegate persistence to a `ProjectRepository`.
//!
//! # Invariants
//! - Repository calls only ever see mapped, typed input.
//! - Every failure is logged once and returned unchanged in kind.

use crate::mapper::{map_new_project, map_project_list, map_project_patch};
use crate::model::project::{Project, ProjectId};
use crate::repo::project_repo::ProjectRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::log_failure;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Paginated project list returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListResult {
    pub projects: Vec<Project>,
    /// Matching rows before pagination.
    pub total: u64,
    pub page: u32,
    /// Number of items in this page.
    pub size: usize,
}

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project from a JSON body and returns its surrogate id.
    pub fn create_project(&self, body: &Value) -> ServiceResult<ProjectId> {
        let run = || -> ServiceResult<ProjectId> {
            let draft = map_new_project(body)?;
            let id = self.repo.create_project(&draft)?;
            info!(
                "event=project_create module=service status=ok id={} code={}",
                id, draft.code
            );
            Ok(id)
        };
        run().map_err(|err| log_failure("project_create", err))
    }

    pub fn get_project(&self, code: &str) -> ServiceResult<Project> {
        self.repo
            .get_project_by_code(code)
            .map_err(|err| log_failure("project_get", ServiceError::from(err)))
    }

    /// Lists projects from raw query parameters.
    pub fn list_projects(
        &self,
        params: &HashMap<String, String>,
    ) -> ServiceResult<ProjectListResult> {
        let run = || -> ServiceResult<ProjectListResult> {
            let query = map_project_list(params)?;
            let page = self.repo.list_projects(&query)?;
            Ok(ProjectListResult {
                size: page.items.len(),
                projects: page.items,
                total: page.total,
                page: query.page,
            })
        };
        run().map_err(|err| log_failure("project_list", err))
    }

    /// Applies a partial update from a JSON body.
    pub fn update_project(&self, code: &str, body: &Value) -> ServiceResult<()> {
        let run = || -> ServiceResult<()> {
            let patch = map_project_patch(body)?;
            self.repo.update_project(code, &patch)?;
            info!("event=project_update module=service status=ok code={code}");
            Ok(())
        };
        run().map_err(|err| log_failure("project_update", err))
    }

    pub fn delete_project(&self, code: &str) -> ServiceResult<()> {
        let run = || -> ServiceResult<()> {
            self.repo.delete_project(code)?;
            info!("event=project_delete module=service status=ok code={code}");
            Ok(())
        };
        run().map_err(|err| log_failure("project_delete", err))
    }
}
