use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::aggregator::{self, Dashboard};
use crate::client::FraudClient;
use crate::config::Config;
use crate::error::{ClientError, UploadError};
use crate::logs::{self, LogQuery, LogsView};
use crate::models::{FeatureForm, FeatureRecord};
use crate::orchestrator::Prediction;
use crate::upload;

/// Batch files are forwarded whole
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared by every handler. The client is built once in `main`.
#[derive(Clone)]
pub struct AppState {
    client: Arc<FraudClient>,
    cfg: Config,
    // Held for the duration of one prediction; a second request is turned away
    in_flight: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(cfg: Config, client: Arc<FraudClient>) -> Self {
        Self {
            client,
            cfg,
            in_flight: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("a prediction is already in flight, try again")]
    Busy,

    #[error("invalid feature record: {0}")]
    BadBody(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Busy => (StatusCode::CONFLICT, "busy", self.to_string()),
            // Same kind as a failed field check, so the form handles both alike
            ApiError::BadBody(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                self.to_string(),
            ),
            ApiError::Client(err @ ClientError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.kind(), err.to_string())
            }
            ApiError::Client(err) => (StatusCode::BAD_GATEWAY, err.kind(), err.to_string()),
            ApiError::Upload(UploadError::Client(err)) => {
                (StatusCode::BAD_GATEWAY, err.kind(), err.to_string())
            }
            ApiError::Upload(UploadError::Io(err)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            ApiError::Upload(err) => (StatusCode::BAD_REQUEST, "invalid_csv", err.to_string()),
        };

        warn!("Request failed ({}): {}", kind, message);
        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Fraud dashboard API running" }))
        .route("/api/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/dashboard", get(dashboard))
        .route("/api/logs", get(history))
        .route(
            "/api/upload",
            post(upload_batch).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn serve(cfg: Config, client: Arc<FraudClient>) -> eyre::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));
    let app = router(AppState::new(cfg, client));

    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "backend": state.client.health().await }))
}

async fn predict(
    State(state): State<AppState>,
    form: Result<Json<FeatureForm>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(form) = form?;
    let _guard = state.in_flight.try_lock().map_err(|_| ApiError::Busy)?;

    let record = FeatureRecord::try_from(form).map_err(ClientError::from)?;
    let verdict = Prediction::new(state.client.as_ref(), state.cfg.fallback_enabled)
        .submit(record)
        .await?;

    Ok(Json(verdict).into_response())
}

async fn dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(aggregator::load_dashboard(&state.client, state.cfg.recent_logs_limit).await)
}

async fn history(State(state): State<AppState>, Query(query): Query<LogQuery>) -> Json<LogsView> {
    Json(logs::search(&state.client, &query).await)
}

async fn upload_batch(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file_name = params.filename.unwrap_or_else(|| "upload.csv".to_string());
    let result = upload::upload_bytes(&state.client, &file_name, body.to_vec()).await?;
    Ok(Json(result))
}
