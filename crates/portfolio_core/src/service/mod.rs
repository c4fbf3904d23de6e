//! Core use-case services.
//!
//! # Responsibility
//! - Run request mapping, then repository calls, per endpoint use-case.
//! - Collapse mapper and repository failures into one caller-facing
//!   taxonomy (`ServiceError`).
//! - Emit metadata-only audit events for every write.

pub mod association_service;
pub mod error;
pub mod project_service;
pub mod software_service;

use error::ServiceError;
use log::{error, warn};

/// Logs a failed use-case and hands the error back to the caller.
///
/// Storage failures log at `error`; caller mistakes at `warn`.
pub(crate) fn log_failure(event: &str, err: ServiceError) -> ServiceError {
    match &err {
        ServiceError::Storage(source) => error!(
            "event={} module=service status=error error_code={} error={}",
            event,
            err.code(),
            source
        ),
        _ => warn!(
            "event={} module=service status=rejected error_code={} reason={}",
            event,
            err.code(),
            err
        ),
    }
    err
}
