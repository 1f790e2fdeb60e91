//! Round persistence endpoint
//!
//! POST /save_score_table

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, store::ResultRecord, AppState};

/// Results of one completed round
///
/// Shape is enforced by deserialization: `round` must be an integer and every
/// result must carry both labels, either as an object or as a
/// `[expected, chosen]` array. Label values are stored as given.
#[derive(Debug, Deserialize)]
pub struct SaveScoreRequest {
    pub round: i64,
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Serialize)]
pub struct SaveScoreResponse {
    pub message: String,
    pub file: String,
}

/// POST /save_score_table
pub async fn save_score_table(
    State(state): State<AppState>,
    payload: Result<Json<SaveScoreRequest>, JsonRejection>,
) -> ApiResult<Json<SaveScoreResponse>> {
    let Json(request) = payload?;

    let service = state.service.clone();
    let location = tokio::task::spawn_blocking(move || {
        service.persist_round(request.round, request.results)
    })
    .await??;

    Ok(Json(SaveScoreResponse {
        message: "Saved".to_string(),
        file: location.path.display().to_string(),
    }))
}

/// Build score persistence routes
pub fn score_routes() -> Router<AppState> {
    Router::new().route("/save_score_table", post(save_score_table))
}
