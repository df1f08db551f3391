//! API handlers for the sqllab service.
//!
//! Provides:
//! - `GET /api/health`: liveness probe
//! - `GET /api/queries`: the raw annotated queries file
//! - `POST /api/run/query`: execute one named query by id
//! - `GET /api/introspect`: tables and columns from the catalog

use super::AppState;
use crate::db::{self, Column, DatabaseSession, QueryResult};
use crate::error::LabError;
use crate::query::{ExecutionOutcome, QueryRunner};
use crate::store;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Error response carrying a status code and a JSON `error` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<LabError> for ApiError {
    fn from(error: LabError) -> Self {
        match &error {
            LabError::File(_) | LabError::QueryNotFound(_) => Self::not_found(error.to_string()),
            LabError::Config(_) => Self::bad_request(error.to_string()),
            LabError::Connection(_) | LabError::Query(_) | LabError::Internal(_) => {
                Self::internal(error.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Handler for `GET /api/health`.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Response for `GET /api/queries`.
#[derive(Debug, Serialize)]
pub struct QueriesResponse {
    /// The raw annotated SQL text, as stored on disk.
    pub sql: String,
}

/// Handler for `GET /api/queries`.
///
/// Returns the queries file verbatim so the front-end can display the
/// annotated SQL to students.
pub async fn get_queries_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<QueriesResponse>, ApiError> {
    let sql = read_queries_file(&state).await?;
    Ok(Json(QueriesResponse { sql }))
}

/// Request body for `POST /api/run/query`.
#[derive(Debug, Deserialize)]
pub struct RunQueryRequest {
    /// Identifier of the query to run.
    pub qid: String,
}

/// Response for a successful `POST /api/run/query`.
#[derive(Debug, Serialize)]
pub struct RunQueryResponse {
    pub status: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub qid: String,
}

/// Handler for `POST /api/run/query`.
///
/// Looks the query up by id in the parsed file, then runs it on a fresh
/// session under the timeout policy. An unknown id is 404, never a
/// silently empty result; an empty body is rejected without touching the
/// database.
pub async fn run_query_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RunQueryRequest>,
) -> Result<Json<RunQueryResponse>, ApiError> {
    let text = read_queries_file(&state).await?;
    let records = store::parse(&text);

    let record = store::find_query(&records, &request.qid)
        .ok_or_else(|| ApiError::from(LabError::query_not_found(&request.qid)))?;

    if record.body.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Query {} has an empty body",
            request.qid
        )));
    }

    let mut session = db::connect(&state.connection).await.map_err(ApiError::from)?;
    let outcome = QueryRunner::new(session.as_mut(), &state.timeouts)
        .run_query(&record.body)
        .await;
    close_session(session).await;

    match outcome {
        ExecutionOutcome::Success(result) => {
            let rows = rows_as_objects(&result);
            Ok(Json(RunQueryResponse {
                status: "success",
                columns: result.columns,
                rows,
                qid: request.qid,
            }))
        }
        ExecutionOutcome::Failure(reason) => Err(ApiError::internal(format!(
            "Query execution failed: {reason}"
        ))),
    }
}

/// Response for `GET /api/introspect`.
#[derive(Debug, Serialize)]
pub struct IntrospectResponse {
    /// The inspected schema name.
    pub schema: &'static str,

    /// Columns per table, keyed by table name.
    pub tables: serde_json::Map<String, serde_json::Value>,
}

/// Handler for `GET /api/introspect`.
pub async fn introspect_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<IntrospectResponse>, ApiError> {
    let mut session = db::connect(&state.connection).await.map_err(ApiError::from)?;

    let outcome = match session.apply_timeouts(&state.timeouts).await {
        Ok(()) => session.introspect_schema().await,
        Err(e) => Err(e),
    };
    close_session(session).await;

    let schema = outcome
        .map_err(|e| ApiError::internal(format!("Introspection failed: {e}")))?;

    let mut tables = serde_json::Map::new();
    for table in schema.tables {
        tables.insert(table.name, columns_to_json(&table.columns)?);
    }

    Ok(Json(IntrospectResponse {
        schema: "public",
        tables,
    }))
}

async fn read_queries_file(state: &AppState) -> Result<String, ApiError> {
    tokio::fs::read_to_string(&state.queries_path)
        .await
        .map_err(|_| ApiError::not_found(format!("{} not found", state.queries_path.display())))
}

/// Closes a session, logging rather than failing the request when the
/// close itself errors; the response is already decided at that point.
async fn close_session(session: Box<dyn DatabaseSession>) {
    if let Err(e) = session.close().await {
        warn!("Failed to close database session: {e}");
    }
}

/// Zips each row with the column names into an ordered JSON object.
fn rows_as_objects(result: &QueryResult) -> Vec<serde_json::Map<String, serde_json::Value>> {
    result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| (column.clone(), value.to_json()))
                .collect()
        })
        .collect()
}

fn columns_to_json(columns: &[Column]) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(columns)
        .map_err(|e| ApiError::internal(format!("Failed to serialize schema: {e}")))
}
