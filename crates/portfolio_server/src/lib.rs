//! HTTP surface for the portfolio registry.
//!
//! # Responsibility
//! - Route HTTP requests to core use-case services.
//! - Serialize results and map service errors to status codes.
//! - Load process configuration.
//!
//! # Invariants
//! - Handlers never touch SQLite on the async executor; all storage work
//!   runs on the blocking pool with one scoped connection acquisition.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::{router, AppState};
