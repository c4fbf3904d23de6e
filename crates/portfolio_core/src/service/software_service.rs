//! Software use-case service.

use crate::mapper::{map_new_software, map_software_patch};
use crate::model::software::{Software, SoftwareId};
use crate::repo::software_repo::SoftwareRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::log_failure;
use log::info;
use serde::Serialize;
use serde_json::Value;

/// All versions registered under one software name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareVersions {
    pub software: Vec<Software>,
    pub total: u64,
}

/// Software service facade over repository implementations.
pub struct SoftwareService<R: SoftwareRepository> {
    repo: R,
}

impl<R: SoftwareRepository> SoftwareService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_software(&self, body: &Value) -> ServiceResult<SoftwareId> {
        let run = || -> ServiceResult<SoftwareId> {
            let draft = map_new_software(body)?;
            let id = self.repo.create_software(&draft)?;
            info!(
                "event=software_create module=service status=ok id={} name={} version={}",
                id, draft.name, draft.version
            );
            Ok(id)
        };
        run().map_err(|err| log_failure("software_create", err))
    }

    pub fn list_versions(&self, name: &str) -> ServiceResult<SoftwareVersions> {
        let page = self
            .repo
            .list_software_by_name(name)
            .map_err(|err| log_failure("software_list", ServiceError::from(err)))?;
        Ok(SoftwareVersions {
            software: page.items,
            total: page.total,
        })
    }

    pub fn update_software(&self, name: &str, version: &str, body: &Value) -> ServiceResult<()> {
        let run = || -> ServiceResult<()> {
            let patch = map_software_patch(body)?;
            self.repo.update_software(name, version, &patch)?;
            info!("event=software_update module=service status=ok name={name} version={version}");
            Ok(())
        };
        run().map_err(|err| log_failure("software_update", err))
    }

    pub fn delete_software(&self, name: &str, version: &str) -> ServiceResult<()> {
        let run = || -> ServiceResult<()> {
            self.repo.delete_software(name, version)?;
            info!("event=software_delete module=service status=ok name={name} version={version}");
            Ok(())
        };
        run().map_err(|err| log_failure("software_delete", err))
    }
}
