// HTTP API
// axum router over a shared, read-only detector

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::services::detection::AiTextDetector;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<AiTextDetector>,
}

impl AppState {
    pub fn new(detector: AiTextDetector) -> Self {
        Self {
            detector: Arc::new(detector),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.detector.is_trained()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the model for serving. Failures are logged and the service starts
/// without a model, reporting `unhealthy` until restarted with one.
pub fn load_detector(model_dir: &Path) -> AiTextDetector {
    let mut detector = AiTextDetector::new();
    if !AiTextDetector::model_exists(model_dir) {
        warn!("[MODEL] No model found in {} - train first!", model_dir.display());
        return detector;
    }

    match detector.load_model(model_dir) {
        Ok(()) => info!("[MODEL] Model loaded successfully"),
        Err(e) => error!("[MODEL] Error loading model: {}", e),
    }
    detector
}

/// Bind and serve until Ctrl+C
pub async fn serve(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(
        "[API] Listening on http://{} (model_loaded={})",
        listener.local_addr()?,
        state.model_loaded()
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("[API] Shutdown requested");
        })
        .await
}
