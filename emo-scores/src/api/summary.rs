//! Summary and feedback endpoints
//!
//! GET /api/emotion_summary, GET /get_feedback_all

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    error::ApiResult,
    feedback,
    summary::{EmotionSummary, SummaryOutcome},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct OverallStatsResponse {
    pub total_questions: u64,
    pub total_correct: u64,
    pub overall_accuracy: f64,
}

/// Wire form of [`EmotionSummary`]
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub emotions: Vec<String>,
    pub matrix: Vec<Vec<u64>>,
    pub base_vector: Vec<f64>,
    pub user_direction_vector: Vec<f64>,
    pub accuracies: BTreeMap<String, f64>,
    pub totals: BTreeMap<String, u64>,
    pub corrects: BTreeMap<String, u64>,
    pub overall_stats: OverallStatsResponse,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub data_points: usize,
    pub skipped_artifacts: usize,
}

impl From<&EmotionSummary> for SummaryResponse {
    fn from(summary: &EmotionSummary) -> Self {
        let stats = &summary.stats;
        let by_label = |f: fn(&crate::stats::LabelStats) -> u64| {
            stats
                .per_label
                .iter()
                .map(|s| (s.label.clone(), f(s)))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            emotions: summary.labels.clone(),
            matrix: summary.matrix.to_rows(),
            base_vector: stats.base_vector.clone(),
            user_direction_vector: stats.direction_vector.clone(),
            accuracies: stats
                .per_label
                .iter()
                .map(|s| (s.label.clone(), s.accuracy))
                .collect(),
            totals: by_label(|s| s.total),
            corrects: by_label(|s| s.correct),
            overall_stats: OverallStatsResponse {
                total_questions: stats.overall.total_questions,
                total_correct: stats.overall.total_correct,
                overall_accuracy: stats.overall.accuracy,
            },
            strengths: stats.strengths.clone(),
            weaknesses: stats.weaknesses.clone(),
            data_points: summary.data_points,
            skipped_artifacts: summary.skipped_artifacts,
        }
    }
}

/// Body of GET /api/emotion_summary
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SummaryBody {
    Summary(Box<SummaryResponse>),
    NoData { status: String, message: String },
}

impl From<&SummaryOutcome> for SummaryBody {
    fn from(outcome: &SummaryOutcome) -> Self {
        match outcome {
            SummaryOutcome::Summary(summary) => SummaryBody::Summary(Box::new(SummaryResponse::from(summary))),
            SummaryOutcome::NoData => SummaryBody::NoData {
                status: "no_data".to_string(),
                message: "No data available. Play some emotion recognition games first.".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LabelStatsResponse {
    pub correct: u64,
    pub wrong: u64,
    pub total: u64,
    pub accuracy: f64,
}

/// Body of GET /get_feedback_all
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub stats: BTreeMap<String, LabelStatsResponse>,
    pub overall_accuracy: f64,
    pub total_questions: u64,
}

async fn summarize(state: &AppState) -> ApiResult<SummaryOutcome> {
    let service = state.service.clone();
    Ok(tokio::task::spawn_blocking(move || service.summarize()).await?)
}

/// GET /api/emotion_summary
pub async fn get_emotion_summary(State(state): State<AppState>) -> ApiResult<Json<SummaryBody>> {
    let outcome = summarize(&state).await?;
    Ok(Json(SummaryBody::from(&outcome)))
}

/// GET /get_feedback_all
pub async fn get_feedback_all(State(state): State<AppState>) -> ApiResult<Json<FeedbackResponse>> {
    let outcome = summarize(&state).await?;
    let rendered = feedback::render(&outcome);

    let stats: BTreeMap<String, LabelStatsResponse> = outcome
        .summary()
        .map(|summary| {
            summary
                .stats
                .per_label
                .iter()
                .map(|s| {
                    (
                        s.label.clone(),
                        LabelStatsResponse {
                            correct: s.correct,
                            wrong: s.total - s.correct,
                            total: s.total,
                            accuracy: s.accuracy,
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(FeedbackResponse {
        feedback: rendered.text,
        stats,
        overall_accuracy: rendered.overall_accuracy,
        total_questions: rendered.total_questions,
    }))
}

/// Build summary routes
pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/api/emotion_summary", get(get_emotion_summary))
        .route("/get_feedback_all", get(get_feedback_all))
}
