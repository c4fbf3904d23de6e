//! Route table and request handlers.

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use portfolio_core::{
    core_version, AssociationService, Connection, ProjectListResult, ProjectService,
    ServiceResult, SoftwareService, SoftwareVersions, SqliteAssociationRepository,
    SqliteProjectRepository, SqliteSoftwareRepository, Store,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

type JsonResult = Result<(StatusCode, Json<Value>), ApiError>;

/// Shared handler state: the owned storage handle.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Runs one storage operation on the blocking pool.
    ///
    /// A pooled connection is checked out inside the task and returned to
    /// the pool when `op` returns.
    async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || {
            let conn = store.acquire()?;
            op(&*conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?;
        outcome.map_err(ApiError::from)
    }
}

/// Builds the application router over `store`.
pub fn router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", post(create_project).get(list_projects))
        .route("/projects/software", post(associate_software))
        .route(
            "/projects/{code}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/software", post(create_software))
        .route("/software/{name}", get(list_software_versions))
        .route(
            "/software/{name}/{version}",
            put(update_software).delete(delete_software),
        )
        .fallback(not_found)
        .with_state(AppState::new(store))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": core_version() }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Resource not found" })),
    )
}

/// Decodes a request body; an empty body becomes `null` so the mapper can
/// report the missing payload itself.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("Request body is not valid JSON: {err}")))
}

fn message(status: StatusCode, text: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": text })))
}

async fn create_project(State(state): State<AppState>, body: Bytes) -> JsonResult {
    let body = parse_body(&body)?;
    let id = state
        .run(move |conn| {
            ProjectService::new(SqliteProjectRepository::new(conn)).create_project(&body)
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Project created successfully", "id": id })),
    ))
}

async fn get_project(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> JsonResult {
    let project = state
        .run(move |conn| {
            ProjectService::new(SqliteProjectRepository::new(conn)).get_project(&code)
        })
        .await?;
    Ok((StatusCode::OK, Json(json!(project))))
}

async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<HashMap<String, String>>,
) -> Result<Json<ProjectListResult>, ApiError> {
    let listed = state
        .run(move |conn| {
            ProjectService::new(SqliteProjectRepository::new(conn)).list_projects(&params)
        })
        .await?;
    Ok(Json(listed))
}

async fn update_project(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    body: Bytes,
) -> JsonResult {
    let body = parse_body(&body)?;
    state
        .run(move |conn| {
            ProjectService::new(SqliteProjectRepository::new(conn)).update_project(&code, &body)
        })
        .await?;
    Ok(message(StatusCode::OK, "Project updated successfully"))
}

async fn delete_project(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> JsonResult {
    state
        .run(move |conn| {
            ProjectService::new(SqliteProjectRepository::new(conn)).delete_project(&code)
        })
        .await?;
    Ok(message(StatusCode::OK, "Project deleted successfully"))
}

async fn create_software(State(state): State<AppState>, body: Bytes) -> JsonResult {
    let body = parse_body(&body)?;
    let id = state
        .run(move |conn| {
            SoftwareService::new(SqliteSoftwareRepository::new(conn)).create_software(&body)
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Software created successfully", "id": id })),
    ))
}

async fn list_software_versions(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<SoftwareVersions>, ApiError> {
    let versions = state
        .run(move |conn| {
            SoftwareService::new(SqliteSoftwareRepository::new(conn)).list_versions(&name)
        })
        .await?;
    Ok(Json(versions))
}

async fn update_software(
    State(state): State<AppState>,
    ApiPath((name, version)): ApiPath<(String, String)>,
    body: Bytes,
) -> JsonResult {
    let body = parse_body(&body)?;
    state
        .run(move |conn| {
            SoftwareService::new(SqliteSoftwareRepository::new(conn))
                .update_software(&name, &version, &body)
        })
        .await?;
    Ok(message(StatusCode::OK, "Software updated successfully"))
}

async fn delete_software(
    State(state): State<AppState>,
    ApiPath((name, version)): ApiPath<(String, String)>,
) -> JsonResult {
    state
        .run(move |conn| {
            SoftwareService::new(SqliteSoftwareRepository::new(conn))
                .delete_software(&name, &version)
        })
        .await?;
    Ok(message(StatusCode::OK, "Software deleted successfully"))
}

async fn associate_software(State(state): State<AppState>, body: Bytes) -> JsonResult {
    let body = parse_body(&body)?;
    let link = state
        .run(move |conn| {
            AssociationService::new(SqliteAssociationRepository::new(conn)).associate(&body)
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Software successfully associated with project",
            "id": link.id
        })),
    ))
}
