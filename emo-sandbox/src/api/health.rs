//! Health check endpoint

use axum::{routing::get, Json, Router};
use chrono::Utc;

use crate::models::HealthCheck;
use crate::AppState;

/// GET / and GET /health
pub async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy".to_string(),
        message: "Sandbox analysis service is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}
