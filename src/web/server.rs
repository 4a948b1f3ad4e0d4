//! Axum web server for askdata
//!
//! Exposes the analyst over HTTP and keeps an in-memory history of answered
//! questions for the session.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::analyst::{Analyst, AnalystError, AnalystResponse};
use crate::dataset::{self, DatasetError, InferenceOptions};
use crate::oracle::OracleError;
use crate::session::{History, HistoryEntry};

/// Application state shared across handlers
pub struct AppState {
    pub analyst: Analyst,
    pub inference: InferenceOptions,
    pub history: Mutex<History>,
}

impl AppState {
    pub fn new(analyst: Analyst, inference: InferenceOptions) -> Self {
        Self {
            analyst,
            inference,
            history: Mutex::new(History::new()),
        }
    }
}

/// Build the axum router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/history", get(list_history).delete(clear_history))
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn serve(state: AppState, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr, "askdata server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub question: String,
    /// CSV text, header row first.
    pub csv: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// A failed request, rendered as `{"error": "..."}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }
}

impl From<AnalystError> for ApiError {
    fn from(err: AnalystError) -> Self {
        let status = match &err {
            AnalystError::Plan(_) | AnalystError::Execution(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AnalystError::Oracle(OracleError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AnalystError::Oracle(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalystResponse>, ApiError> {
    let dataset = dataset::load_str(&req.csv, state.inference)?;

    let response = state
        .analyst
        .ask(&dataset, &req.question)
        .await
        .inspect_err(|e| warn!(error = %e, "request failed"))?;

    state.history.lock().await.record(&req.question, &response);
    Ok(Json(response))
}

async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.lock().await.entries().to_vec())
}

async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.history.lock().await.clear();
    StatusCode::NO_CONTENT
}
