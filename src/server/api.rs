//! Flight-delay prediction HTTP API.
//!
//! - GET  /health/
//! - POST /model/load/
//! - POST /model/predict/
//! - GET  /model/history/
//! - GET  /metrics
//! - GET  /openapi.json

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::inference::features::{FlightFeatures, ValidationError};
use crate::inference::history::PredictionRecord;
use crate::inference::service::{InferenceService, ServiceError};
use crate::model::store::ModelHandle;
use crate::server::error::ApiError;
use crate::server::metrics::Metrics;
use crate::server::openapi;

pub const HEALTH_MESSAGE: &str = "API is running";
pub const MODEL_LOADED_MESSAGE: &str = "Model loaded successfully";

/// Multipart field carrying the model artifact.
const ARTIFACT_FIELD: &str = "file";

/// Application state shared across handlers.
pub struct AppState {
    pub service: InferenceService,
    pub metrics: Metrics,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> prometheus::Result<Self> {
        Ok(Self {
            service: InferenceService::new(),
            metrics: Metrics::new()?,
            config,
        })
    }

    /// Load an artifact into the service and account for the attempt.
    pub async fn load_artifact(&self, raw: &[u8]) -> Result<ModelHandle, ServiceError> {
        match self.service.load_model(raw).await {
            Ok(handle) => {
                self.metrics.record_model_load("ok");
                Ok(handle)
            }
            Err(e) => {
                self.metrics.record_model_load(e.label());
                Err(e)
            }
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload = state.config.server.max_upload_bytes;
    let cors = if state.config.server.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health/", get(health))
        .route(
            "/model/load/",
            post(load_model).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/model/predict/", post(predict))
        .route("/model/history/", get(history))
        .route("/metrics", get(metrics))
        .route("/openapi.json", get(openapi_document))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: f64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<PredictionRecord>,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: HEALTH_MESSAGE.to_string(),
    })
}

async fn load_model(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let artifact = read_artifact(multipart?).await?;
    info!(
        request_id = request_id,
        bytes = artifact.len(),
        "Model load request"
    );

    match state.load_artifact(&artifact).await {
        Ok(handle) => {
            info!(
                request_id = request_id,
                model_id = %handle.id(),
                kind = %handle.kind(),
                "Model load complete"
            );
            Ok(Json(StatusResponse {
                status: MODEL_LOADED_MESSAGE.to_string(),
            }))
        }
        Err(e) => {
            warn!(request_id = request_id, error = %e, "Model load rejected");
            Err(e.into())
        }
    }
}

/// Pull the artifact bytes out of the `file` field.
async fn read_artifact(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(ARTIFACT_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(ValidationError::Malformed(format!(
        "multipart field `{ARTIFACT_FIELD}` is required"
    ))
    .into())
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlightFeatures>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let Json(features) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            state.metrics.record_prediction("validation_error");
            return Err(rejection.into());
        }
    };

    let started = Instant::now();
    let result = state.service.predict(features).await;
    state
        .metrics
        .observe_inference(started.elapsed().as_secs_f64());

    match result {
        Ok(prediction) => {
            state.metrics.record_prediction("ok");
            state
                .metrics
                .set_history_entries(state.service.history_len().await);
            info!(request_id = request_id, prediction, "Prediction served");
            Ok(Json(PredictionResponse { prediction }))
        }
        Err(e) => {
            state.metrics.record_prediction(e.label());
            match &e {
                ServiceError::Inference(_) => {
                    tracing::error!(request_id = request_id, error = %e, "Inference failed")
                }
                _ => warn!(request_id = request_id, error = %e, "Prediction rejected"),
            }
            Err(e.into())
        }
    }
}

async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: state.service.history().await,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::internal(format!("Failed to encode metrics: {e}")))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

async fn openapi_document() -> Json<serde_json::Value> {
    Json(openapi::document())
}
