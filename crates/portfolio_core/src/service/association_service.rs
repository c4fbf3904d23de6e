//! Association use-case service.

use crate::mapper::map_association;
use crate::model::association::ProjectSoftwareLink;
use crate::repo::association_repo::AssociationRepository;
use crate::service::error::ServiceResult;
use crate::service::log_failure;
use log::info;
use serde_json::Value;

pub struct AssociationService<R: AssociationRepository> {
    repo: R,
}

impl<R: AssociationRepository> AssociationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Links a project to a software version named in a JSON body.
    ///
    /// # Contract
    /// - Body fields: `code`, `software_name`, `version` (all required).
    /// - Returns the created link row.
    pub fn associate(&self, body: &Value) -> ServiceResult<ProjectSoftwareLink> {
        let run = || -> ServiceResult<ProjectSoftwareLink> {
            let request = map_association(body)?;
            let link =
                self.repo
                    .associate(&request.code, &request.software_name, &request.version)?;
            info!(
                "event=association_create module=service status=ok id={} project_id={} software_id={}",
                link.id, link.project_id, link.software_id
            );
            Ok(link)
        };
        run().map_err(|err| log_failure("association_create", err))
    }
}
