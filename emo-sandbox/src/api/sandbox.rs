//! Sandbox analysis endpoint
//!
//! POST /analyze_sandbox (with or without a trailing slash) accepts either a
//! `multipart/form-data` upload with `file`, `user_id` and `prompt` fields, or
//! the raw image as the request body with `user_id` and `prompt` in the query.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::AnalysisHint;
use crate::caption::{validate_image, MAX_IMAGE_BYTES};
use crate::error::{ApiError, ApiResult};
use crate::models::AnalysisResult;
use crate::AppState;

/// Room for multipart boundaries and the text fields around the image
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

const NOT_AN_IMAGE: &str = "Only image file formats (JPEG, PNG) are supported";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub user_id: Option<String>,
    pub prompt: Option<String>,
}

/// Image plus the caller's optional context, however it was sent
struct Upload {
    image: Bytes,
    user_id: Option<String>,
    prompt: Option<String>,
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn upload_error(detail: String) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid image format or file too large (max 10MB): {}",
        detail
    ))
}

fn multipart_error(e: MultipartError) -> ApiError {
    upload_error(e.body_text())
}

async fn read_form(mut multipart: Multipart, params: AnalyzeParams) -> ApiResult<Upload> {
    let mut image = None;
    let mut user_id = params.user_id;
    let mut prompt = params.prompt;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let is_image = field
                    .content_type()
                    .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
                    .unwrap_or(false);
                if !is_image {
                    return Err(ApiError::BadRequest(NOT_AN_IMAGE.to_string()));
                }
                image = Some(field.bytes().await.map_err(multipart_error)?);
            }
            "user_id" => user_id = non_blank(field.text().await.map_err(multipart_error)?).or(user_id),
            "prompt" => prompt = non_blank(field.text().await.map_err(multipart_error)?).or(prompt),
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    Ok(Upload {
        image,
        user_id,
        prompt,
    })
}

async fn read_raw(request: Request, state: &AppState, params: AnalyzeParams) -> ApiResult<Upload> {
    if !content_type(request.headers()).starts_with("image/") {
        return Err(ApiError::BadRequest(NOT_AN_IMAGE.to_string()));
    }

    let image = Bytes::from_request(request, state)
        .await
        .map_err(|e| upload_error(e.body_text()))?;
    Ok(Upload {
        image,
        user_id: params.user_id,
        prompt: params.prompt,
    })
}

/// POST /analyze_sandbox
pub async fn analyze_sandbox(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    request: Request,
) -> ApiResult<Json<AnalysisResult>> {
    let upload = if content_type(request.headers()).starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        read_form(multipart, params).await?
    } else {
        read_raw(request, &state, params).await?
    };

    let format = validate_image(&upload.image)?;

    let id = Uuid::new_v4();
    info!(%id, user_id = ?upload.user_id, bytes = upload.image.len(), "Processing sandbox image");

    let caption = state.captioner.caption(&upload.image, format).await?;

    let hint = AnalysisHint {
        user_id: upload.user_id,
        prompt: upload.prompt,
    };
    // Analyst failures surface only when no fallback is configured
    let analysis = state
        .analyst
        .analyze(&caption, &hint)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(%id, captioner = state.captioner.name(), analyst = state.analyst.name(), "Completed sandbox analysis");

    Ok(Json(AnalysisResult {
        id,
        caption,
        analysis,
        timestamp: Utc::now(),
        user_id: hint.user_id,
    }))
}

pub fn sandbox_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze_sandbox", post(analyze_sandbox))
        .route("/analyze_sandbox/", post(analyze_sandbox))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES))
}
