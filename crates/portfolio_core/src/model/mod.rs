//! Registry domain model.
//!
//! # Responsibility
//! - Define API-facing records for projects, software and their links.
//! - Define write-side drafts/patches and their field-level validation.
//!
//! # Invariants
//! - Records carry both the surrogate `id` and the natural key.
//! - Date fields are ISO `YYYY-MM-DD` strings once validated.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod association;
pub mod project;
pub mod software;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field-level validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is absent or blank.
    MissingField(&'static str),
    /// Date field is not an ISO calendar date.
    InvalidDate { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be a YYYY-MM-DD date, got `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Checks that `value` is a zero-padded calendar date.
///
/// Padding matters: filters compare dates as text.
pub(crate) fn validate_date(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    };
    let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    if parsed.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(())
}
