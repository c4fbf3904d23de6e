//! Software records and write models.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate identifier of a software row.
pub type SoftwareId = i64;

/// Persisted software version as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub id: SoftwareId,
    pub name: String,
    pub version: String,
    pub vendor: Option<String>,
    pub deprecated: bool,
}

impl Software {
    pub fn major_version(&self) -> &str {
        major_version(&self.version)
    }
}

/// Returns the part of `version` before its first `.`.
///
/// `"2.4.1"` -> `"2"`, `"2024"` -> `"2024"`.
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Input for software creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSoftware {
    pub name: String,
    pub version: String,
    pub vendor: Option<String>,
    pub deprecated: bool,
}

impl NewSoftware {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            vendor: None,
            deprecated: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("version", &self.version)?;
        Ok(())
    }
}

/// Partial update for a software version.
///
/// `vendor: Some(None)` clears the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftwarePatch {
    pub vendor: Option<Option<String>>,
    pub deprecated: Option<bool>,
}

impl SoftwarePatch {
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none() && self.deprecated.is_none()
    }
}
