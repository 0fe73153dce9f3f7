// API Errors
// Maps request and detector failures onto HTTP status codes with an
// `{"error": ...}` body.

use crate::models::ErrorResponse;
use crate::services::detection::DetectorError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error("Prediction task failed: {0}")]
    Task(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ModelNotLoaded | Self::Detector(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("[API] {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
