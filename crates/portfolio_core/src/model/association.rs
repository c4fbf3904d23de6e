//! Project/software link records.

use super::project::ProjectId;
use super::software::SoftwareId;
use serde::{Deserialize, Serialize};

pub type AssociationId = i64;

/// One row of `project_software`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSoftwareLink {
    pub id: AssociationId,
    pub project_id: ProjectId,
    pub software_id: SoftwareId,
}
