//! HTTP boundary for voice assistants and LLM tool calls.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Status, version, uptime and per-source availability |
//! | `GET`  | `/data/sources` | Registered sources with descriptions and data types |
//! | `GET`  | `/data/{source}` | Query a source; filters and paging come from the query string |
//! | `GET`  | `/schema/functions` | Function-calling schemas, one per source |
//! | `POST` | `/functions/{name}` | Call `query_<source>` with a JSON body of parameters |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Unknown source 'x'. Available: crm, support, analytics" } }
//! ```
//!
//! Error codes: `not_found` (404), `invalid_params` (422), `internal` (500).
//! Internal error details are only included when `[server].debug` is set.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{DataResponse, DataType};
use crate::params::FunctionSchema;
use crate::query::{split_call_params, DataService, PageRequest, QueryError};

#[derive(Clone)]
pub struct AppState {
    service: Arc<DataService>,
    started: Instant,
    debug: bool,
}

impl AppState {
    pub fn new(service: Arc<DataService>, debug: bool) -> Self {
        Self {
            service,
            started: Instant::now(),
            debug,
        }
    }
}

/// Builds the router with every route and the CORS layer attached.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/data/sources", get(handle_list_sources))
        .route("/data/{source}", get(handle_get_data))
        .route("/schema/functions", get(handle_schema))
        .route("/functions/{name}", post(handle_function_call))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and serves until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(DataService::from_config(config));
    for source in service.registry().sources() {
        if !source.is_available() {
            tracing::warn!(source = source.name(), "data blob not found; source will return no records");
        }
    }

    let app = router(AppState::new(service, config.server.debug));
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        data_dir = %config.data.dir.display(),
        "data connector listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Error response
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn invalid_params(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        code: "invalid_params".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>, debug: bool) -> AppError {
    let message = message.into();
    tracing::error!(error = %message, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: if debug {
            message
        } else {
            "An unexpected error occurred.".to_string()
        },
    }
}

fn classify_query_error(err: QueryError, debug: bool) -> AppError {
    match err {
        QueryError::UnknownSource { .. } => not_found(err.to_string()),
        QueryError::InvalidParams(msg) => invalid_params(msg),
        QueryError::Internal(e) => internal(format!("{:#}", e), debug),
    }
}

/// Runs a query on the blocking pool; the record store reads files synchronously.
async fn run_query<F>(state: &AppState, f: F) -> Result<Json<DataResponse>, AppError>
where
    F: FnOnce(&DataService) -> Result<DataResponse, QueryError> + Send + 'static,
{
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| QueryError::Internal(anyhow::anyhow!("query task failed: {}", e)))
        .and_then(|r| r);

    result
        .map(Json)
        .map_err(|e| classify_query_error(e, state.debug))
}

// ═══════════════════════════════════════════════════════════════════════
// GET /health
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SourceHealth {
    available: bool,
    record_count: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    data_sources: BTreeMap<String, SourceHealth>,
}

fn source_health(service: &DataService) -> BTreeMap<String, SourceHealth> {
    service
        .registry()
        .sources()
        .iter()
        .map(|s| {
            let health = SourceHealth {
                available: s.is_available(),
                record_count: s.record_count(),
            };
            (s.name().to_string(), health)
        })
        .collect()
}

/// Counting records reads every blob, so the scan runs on the blocking pool.
async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let service = state.service.clone();
    let data_sources = tokio::task::spawn_blocking(move || source_health(&service))
        .await
        .map_err(|e| internal(format!("health task failed: {}", e), state.debug))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        data_sources,
    }))
}

// ═══════════════════════════════════════════════════════════════════════
// GET /data/sources
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SourceEntry {
    name: String,
    description: String,
    data_type: DataType,
}

#[derive(Serialize)]
struct SourceListResponse {
    sources: Vec<SourceEntry>,
}

async fn handle_list_sources(State(state): State<AppState>) -> Json<SourceListResponse> {
    let sources = state
        .service
        .registry()
        .sources()
        .iter()
        .map(|s| SourceEntry {
            name: s.name().to_string(),
            description: s.description().to_string(),
            data_type: s.data_type(),
        })
        .collect();
    Json(SourceListResponse { sources })
}

// ═══════════════════════════════════════════════════════════════════════
// GET /data/{source}
// ═══════════════════════════════════════════════════════════════════════

/// Query-string parameters for `GET /data/{source}`.
///
/// Filters a source does not declare are dropped before they reach it.
#[derive(Debug, Default, Deserialize)]
struct DataQuery {
    voice_mode: Option<bool>,
    page: Option<usize>,
    page_size: Option<usize>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    status: Option<String>,
    customer_id: Option<i64>,
    search: Option<String>,
    priority: Option<String>,
    metric: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
}

impl DataQuery {
    fn into_parts(self) -> (Value, PageRequest) {
        let mut params = Map::new();
        let strings = [
            ("sort_by", self.sort_by),
            ("sort_order", self.sort_order),
            ("status", self.status),
            ("search", self.search),
            ("priority", self.priority),
            ("metric", self.metric),
            ("date_from", self.date_from),
            ("date_to", self.date_to),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                params.insert(key.to_string(), Value::String(v));
            }
        }
        if let Some(id) = self.customer_id {
            params.insert("customer_id".to_string(), Value::from(id));
        }

        let page = PageRequest {
            page: self.page,
            page_size: self.page_size,
            voice_mode: self.voice_mode,
        };
        (Value::Object(params), page)
    }
}

async fn handle_get_data(
    State(state): State<AppState>,
    Path(source): Path<String>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Json<DataResponse>, AppError> {
    let Query(query) = query.map_err(|e| invalid_params(e.body_text()))?;
    let (params, page) = query.into_parts();
    run_query(&state, move |svc| svc.query(&source, &params, &page)).await
}

// ═══════════════════════════════════════════════════════════════════════
// GET /schema/functions
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SchemaResponse {
    functions: Vec<FunctionSchema>,
}

async fn handle_schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        functions: state.service.function_schemas(),
    })
}

// ═══════════════════════════════════════════════════════════════════════
// POST /functions/{name}
// ═══════════════════════════════════════════════════════════════════════

/// Dispatches an LLM function call. `page`, `page_size` and `voice_mode`
/// may ride along in the body; everything else is validated against the
/// function's parameter schema.
async fn handle_function_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DataResponse>, AppError> {
    let Json(body) = body.map_err(|e| invalid_params(e.body_text()))?;
    let (params, page) = split_call_params(&body).map_err(|e| classify_query_error(e, state.debug))?;
    run_query(&state, move |svc| svc.call_function(&name, &params, &page)).await
}
