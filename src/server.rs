//! JSON HTTP API over the abstract corpus.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` or `/api` | API description document |
//! | `GET`  | `/abstracts` | List all abstracts with summary metadata |
//! | `GET`  | `/abstracts/{id}` | Full original document by identifier |
//! | `GET`  | `/search?q=` | Case-insensitive substring search |
//! | `GET`  | `/filter?threshold=&domain=` | Confidence/domain filter |
//! | `GET`  | `/validate` | Batch validation report |
//! | `GET`  | `/validate/{id}` | Single-document validation report |
//! | `POST` | `/validate` | Validate a candidate document body |
//! | `GET`  | `/health` | Health check |
//!
//! # Error Contract
//!
//! All error responses share one envelope:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "threshold must be between 0.0 and 1.0" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `not_found`
//! (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted. The CORS layer wraps
//! the auth middleware, so `OPTIONS` preflights succeed without a key.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth;
use crate::config::Config;
use crate::engine::{self, QueryError};
use crate::validate;

/// Shared application state passed to all route handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (wrapped in `Arc` for cheap cloning
    /// across handlers).
    pub config: Arc<Config>,
}

/// Starts the HTTP server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let app = build_router(state);

    println!("Claim Ledger API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the full router. Separated from [`run_server`] so tests can
/// drive it without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api = Router::new()
        .route("/", get(handle_api_docs))
        .route("/api", get(handle_api_docs))
        .route("/abstracts", get(handle_list_abstracts))
        .route("/abstracts/{id}", get(handle_get_abstract))
        .route("/search", get(handle_search))
        .route("/filter", get(handle_filter))
        .route(
            "/validate",
            get(handle_validate_all).post(handle_validate_candidate),
        )
        .route("/validate/{id}", get(handle_validate_one));

    if state.config.auth.is_enabled() {
        api = api.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));
    }

    Router::new()
        .merge(api)
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable
/// message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: message.into(),
        }
    }
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

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidInput(msg) => Self::bad_request(msg),
            QueryError::NotFound(msg) => Self::not_found(msg),
            QueryError::Io(e) => {
                tracing::error!(error = %e, "corpus read failed");
                Self::internal("failed to read the abstract corpus")
            }
        }
    }
}

// ============ GET / and /api ============

/// Handler for `GET /` and `GET /api` — the API description document.
async fn handle_api_docs() -> Json<Value> {
    Json(json!({
        "name": "Claim Ledger API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Bayesian fact-checking corpus with quantified confidence levels",
        "endpoints": {
            "GET /api": {
                "description": "This documentation page"
            },
            "GET /abstracts": {
                "description": "List all available abstracts with metadata"
            },
            "GET /abstracts/{id}": {
                "description": "Get a specific abstract by identifier",
                "parameters": { "id": "Abstract identifier" }
            },
            "GET /search": {
                "description": "Search abstracts by text query",
                "parameters": { "q": "Search query (matches claim, domain, and identifier)" }
            },
            "GET /filter": {
                "description": "Filter abstracts by confidence threshold",
                "parameters": {
                    "threshold": "Minimum confidence level (0.0 to 1.0)",
                    "domain": "Exact domain to match"
                }
            },
            "GET /validate": {
                "description": "Validate all abstracts against schema requirements"
            },
            "POST /validate": {
                "description": "Validate a candidate document supplied as the request body"
            },
            "GET /health": {
                "description": "Health check"
            }
        }
    }))
}

// ============ GET /abstracts ============

/// Handler for `GET /abstracts` — all summaries in traversal order.
async fn handle_list_abstracts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let abstracts = engine::list(&state.config)?;
    Ok(Json(json!({
        "totalAbstracts": abstracts.len(),
        "abstracts": abstracts,
    })))
}

// ============ GET /abstracts/{id} ============

/// Handler for `GET /abstracts/{id}` — the full original document.
async fn handle_get_abstract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doc = engine::get_by_id(&state.config, &id)?;
    Ok(Json(doc))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Handler for `GET /search?q=` — substring search over summaries.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<engine::SearchOutcome>, AppError> {
    let outcome = engine::search(&state.config, params.q.as_deref().unwrap_or(""))?;
    Ok(Json(outcome))
}

// ============ GET /filter ============

/// `threshold` is the documented name; `confidence` is accepted as a
/// legacy alias. Both arrive as strings so a non-numeric value produces
/// this API's error envelope instead of the extractor's.
#[derive(Deserialize)]
struct FilterParams {
    threshold: Option<String>,
    confidence: Option<String>,
    domain: Option<String>,
}

/// Handler for `GET /filter?threshold=&domain=`.
async fn handle_filter(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<engine::FilterOutcome>, AppError> {
    let threshold = match params.threshold.or(params.confidence) {
        Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
            AppError::bad_request("threshold must be a number between 0.0 and 1.0")
        })?),
        None => None,
    };

    let outcome = engine::filter(&state.config, threshold, params.domain.as_deref())?;
    Ok(Json(outcome))
}

// ============ GET /validate and /validate/{id} ============

/// Handler for `GET /validate` — batch validation of the whole corpus.
async fn handle_validate_all(
    State(state): State<AppState>,
) -> Result<Json<validate::BatchReport>, AppError> {
    let report = validate::validate_all(&state.config)?;
    Ok(Json(report))
}

/// Handler for `GET /validate/{id}` — one document's validation report.
async fn handle_validate_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<validate::DocumentReport>, AppError> {
    let report = validate::validate_by_id(&state.config, &id)?;
    Ok(Json(report))
}

// ============ POST /validate ============

/// Handler for `POST /validate` — validates a caller-supplied candidate
/// document. Responds 200 when valid, 400 when invalid, with the same
/// report body either way.
async fn handle_validate_candidate(
    Json(candidate): Json<Value>,
) -> Result<(StatusCode, Json<validate::ValidationReport>), AppError> {
    let report = validate::validate_candidate(&candidate)?;
    let status = if report.valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(report)))
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// Handler for `GET /health`. Public even when authentication is enabled.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Fallback ============

/// Fallback for unmatched paths — a 404 with a hint listing the routes
/// this API serves.
async fn handle_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "not_found",
                "message": "no such route"
            },
            "availableEndpoints": [
                "GET /api",
                "GET /abstracts",
                "GET /abstracts/{id}",
                "GET /search?q=query",
                "GET /filter?threshold=0.70",
                "GET /validate",
                "GET /validate/{id}",
                "POST /validate",
                "GET /health"
            ]
        })),
    )
}
