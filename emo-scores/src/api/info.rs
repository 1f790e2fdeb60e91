//! Service banner and build information

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub endpoints: BTreeMap<String, String>,
}

/// Build information response
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    let endpoints = [
        ("save_score_table", "POST /save_score_table"),
        ("emotion_summary", "GET /api/emotion_summary"),
        ("feedback", "GET /get_feedback_all"),
        ("health", "GET /health"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(ServiceInfo {
        message: "Emotion Recognition Game Backend".to_string(),
        status: "running".to_string(),
        endpoints,
    })
}

/// GET /build_info
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

pub fn info_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/build_info", get(build_info))
}
