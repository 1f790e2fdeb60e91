//! emo-sandbox library - sandbox scene captioning and analysis
//!
//! Accepts a photo of a sandbox-play scene, captions it and produces a
//! psychological analysis of the caption.

pub mod analysis;
pub mod api;
pub mod caption;
pub mod error;
pub mod models;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::Analyst;
use crate::caption::Captioner;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub captioner: Arc<dyn Captioner>,
    pub analyst: Arc<dyn Analyst>,
}

impl AppState {
    pub fn new(captioner: Arc<dyn Captioner>, analyst: Arc<dyn Analyst>) -> Self {
        Self { captioner, analyst }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::sandbox_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
