//! emo-scores library - emotion game score aggregation
//!
//! Persists per-round results of the emotion recognition game and rebuilds
//! an emotion confusion-matrix summary from every stored round on request.

pub mod api;
pub mod error;
pub mod feedback;
pub mod labels;
pub mod matrix;
pub mod stats;
pub mod store;
pub mod summary;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::summary::SummaryService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Persistence and aggregation entry point
    pub service: Arc<SummaryService>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: SummaryService) -> Self {
        Self {
            service: Arc::new(service),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::info_routes())
        .merge(api::health_routes())
        .merge(api::score_routes())
        .merge(api::summary_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
