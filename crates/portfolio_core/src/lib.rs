//! Core domain logic for the project/software portfolio registry.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Connection, Store, StoreConnection};
pub use logging::{
    default_log_level, init_console_logging, init_logging, logging_status, LogTarget,
};
pub use mapper::{AssociationRequest, MapError};
pub use model::association::ProjectSoftwareLink;
pub use model::project::{NewProject, Project, ProjectId, ProjectPatch};
pub use model::software::{NewSoftware, Software, SoftwareId, SoftwarePatch};
pub use model::ValidationError;
pub use repo::association_repo::{AssociationRepository, SqliteAssociationRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::project_repo::{
    ProjectFilter, ProjectListQuery, ProjectRepository, SqliteProjectRepository,
};
pub use repo::software_repo::{SoftwareRepository, SqliteSoftwareRepository};
pub use repo::Page;
pub use service::association_service::AssociationService;
pub use service::error::{ServiceError, ServiceResult};
pub use service::project_service::{ProjectListResult, ProjectService};
pub use service::software_service::{SoftwareService, SoftwareVersions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
