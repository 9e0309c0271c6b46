//! wdsp-cl library - Waste disposal classifier
//!
//! Photographed object → pretrained image classifier → disposal record
//! (recycle, compost, trash, or check locally).

pub mod api;
pub mod config;
pub mod disposal;
pub mod error;
pub mod pipeline;
pub mod vision;

pub use crate::error::{ApiError, ApiResult, Error, Result};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::ClassificationPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Classifier and static tables, loaded once at startup
    pub pipeline: Arc<ClassificationPipeline>,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: ClassificationPipeline, max_upload_bytes: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/classify", post(api::classify_image))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
