// HTTP Handlers
// GET /, GET /health and POST /predict

use crate::models::{HealthResponse, PredictRequest, PredictionResult, ServiceInfo};
use crate::services::detection::analyze;
use crate::services::text_processor::preview;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;

pub const SERVICE_NAME: &str = "AI Text Detector API";

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        ("GET /".to_string(), "Service information".to_string()),
        ("GET /health".to_string(), "Health check".to_string()),
        ("POST /predict".to_string(), "Classify text as AI or Human".to_string()),
    ]);

    Json(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "online".to_string(),
        model_loaded: state.model_loaded(),
        endpoints,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.model_loaded();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
        model_loaded,
    })
}

/// Body problems are reported before the model check so a bad request is
/// always a 400, loaded model or not.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let text = request
        .text
        .ok_or_else(|| ApiError::Validation("Missing \"text\" field".to_string()))?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::Validation("Text cannot be empty".to_string()));
    }

    if !state.model_loaded() {
        return Err(ApiError::ModelNotLoaded);
    }

    debug!(%request_id, text = %preview(&text, 60), "[API] Predict request");

    let detector = Arc::clone(&state.detector);
    let result = tokio::task::spawn_blocking(move || analyze(&detector, &text))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;

    info!(
        %request_id,
        label = %result.label,
        ai_probability = result.ai_probability,
        confidence = %result.confidence,
        "[API] Prediction"
    );
    Ok(Json(result))
}
