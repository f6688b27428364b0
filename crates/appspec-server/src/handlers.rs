//! HTTP request handlers for the server.
//!
//! Implements requirement generation, failure log browsing and health check
//! endpoints using axum.

use appspec_domain::{ErrorSource, FailureRecord, GenerationResult};
use appspec_extractor::{check_prompt_detail, validate_body, Extractor, ExtractorError};
use appspec_store::StoreError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// Message returned for every server-side failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process request";

/// Default number of failure records returned
const DEFAULT_FAILURE_LIMIT: usize = 50;

/// Upper bound on failure records returned
const MAX_FAILURE_LIMIT: usize = 500;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Requirement extractor (owns the provider handle and failure sink)
    pub extractor: Arc<Extractor>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Overall status
    pub status: String,
    /// "live" when a provider is configured, "mock" otherwise
    pub llm_mode: String,
    /// "ready" or "unavailable"
    pub failure_log: String,
}

/// Failure log query parameters
#[derive(Debug, Deserialize)]
pub struct FailureQuery {
    /// Restrict to one error source
    pub source: Option<String>,
    /// Maximum records to return
    pub limit: Option<usize>,
}

/// Failure log listing
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureListResponse {
    /// Number of records returned
    pub count: usize,
    /// Records, most recent first
    pub failures: Vec<FailureRecord>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category label
    pub error: String,
    /// Error message
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Generation failed
    Extraction(ExtractorError),
    /// Query parameters were rejected
    BadQuery(String),
    /// No ready failure log is configured
    FailureLogUnavailable,
    /// Reading the failure log failed
    Store(StoreError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, label, message) = match self {
            AppError::Extraction(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, "Validation Error", e.to_string())
            }
            AppError::BadQuery(msg) => (StatusCode::BAD_REQUEST, "Validation Error", msg),
            AppError::FailureLogUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "Failure log is unavailable".to_string(),
            ),
            AppError::Extraction(_) | AppError::Store(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: label.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extraction(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

/// POST /api/generate - Extract requirements from a description
///
/// A body that is not JSON is treated like one without a `text` field.
async fn generate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResult>, AppError> {
    let body = body.map(|Json(value)| value).unwrap_or(Value::Null);

    let request = validate_body(&body, state.extractor.config().max_text_length)
        .and_then(|request| check_prompt_detail(&request.text).map(|()| request))
        .inspect_err(|e| warn!("Rejected generation request: {}", e))?;

    let result = state.extractor.generate_validated(&request.text).await?;

    Ok(Json(result))
}

/// GET /api/failures - Recent failure records, optionally by source
async fn list_failures(
    State(state): State<AppState>,
    query: Result<Query<FailureQuery>, QueryRejection>,
) -> Result<Json<FailureListResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadQuery(e.body_text()))?;
    let source = query
        .source
        .as_deref()
        .map(str::parse::<ErrorSource>)
        .transpose()
        .map_err(AppError::BadQuery)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FAILURE_LIMIT)
        .min(MAX_FAILURE_LIMIT);

    let log = match state.extractor.sink().log() {
        Some(log) if log.is_ready() => Arc::clone(log),
        _ => return Err(AppError::FailureLogUnavailable),
    };

    let failures = tokio::task::spawn_blocking(move || log.recent(limit, source))
        .await
        .map_err(|e| {
            error!("Failure log query did not complete: {}", e);
            AppError::InternalError(e.to_string())
        })?
        .inspect_err(|e| error!("Failure log query failed: {}", e))?;

    Ok(Json(FailureListResponse {
        count: failures.len(),
        failures,
    }))
}

/// GET /health - Service status
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let failure_log = if state.extractor.sink().is_ready() {
        "ready"
    } else {
        "unavailable"
    };

    Json(HealthCheckResponse {
        status: "ok".to_string(),
        llm_mode: state.extractor.mode().as_str().to_string(),
        failure_log: failure_log.to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/generate", post(generate))
        .route("/api/failures", get(list_failures))
        .route("/health", get(health_check))
        .with_state(state)
}
