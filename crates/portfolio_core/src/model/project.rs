//! Project records and write models.

use super::{require_text, validate_date, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate identifier of a project row.
pub type ProjectId = i64;

/// Persisted project as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Natural key, globally unique.
    pub code: String,
    pub archived: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Input for project creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub code: String,
    pub archived: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewProject {
    /// Creates an active project draft without dates.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            archived: false,
            start_date: None,
            end_date: None,
        }
    }

    /// Validates required fields and date shapes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("code", &self.code)?;
        if let Some(value) = self.start_date.as_deref() {
            validate_date("start_date", value)?;
        }
        if let Some(value) = self.end_date.as_deref() {
            validate_date("end_date", value)?;
        }
        Ok(())
    }
}

/// Partial update for a project.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub archived: Option<bool>,
    pub start_date: Option<Option<String>>,
    pub end_date: Option<Option<String>>,
}

impl ProjectPatch {
    /// Returns whether no updatable field is set.
    pub fn is_empty(&self) -> bool {
        self.archived.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(Some(value)) = self.start_date.as_ref() {
            validate_date("start_date", value)?;
        }
        if let Some(Some(value)) = self.end_date.as_ref() {
            validate_date("end_date", value)?;
        }
        Ok(())
    }
}
