//! HTTP API tests for emo-scores
//!
//! Drives the full router with `oneshot` requests against a temporary root.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use emo_scores::{build_router, AppState};
use helpers::test_service;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(temp_dir: &TempDir) -> Router {
    build_router(AppState::new(test_service(temp_dir.path())))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "emo-scores");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_root_banner_and_build_info() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Emotion Recognition Game Backend");
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["save_score_table"], "POST /save_score_table");

    let (status, body) = get(&app, "/build_info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
}

#[tokio::test]
async fn test_save_score_table_writes_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let request = json!({
        "round": 3,
        "results": [
            { "expected": "happy", "chosen": "happy" },
            { "expected": "sad", "chosen": "angry" }
        ]
    });
    let (status, body) = post_json(&app, "/save_score_table", request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Saved");

    let file = std::path::PathBuf::from(body["file"].as_str().unwrap());
    assert!(file.exists());
    assert!(file.starts_with(temp_dir.path().join("scores")));
    let name = file.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("round3_"), "unexpected name {}", name);
    assert!(name.ends_with(".json"));
}

#[tokio::test]
async fn test_save_score_table_accepts_game_client_keys() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let request = json!({
        "round": 1,
        "results": [{ "correct": "fear", "selected": "surprise" }]
    });
    let (status, _) = post_json(&app, "/save_score_table", request.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = get(&app, "/api/emotion_summary").await;
    assert_eq!(summary["overall_stats"]["total_questions"], 1);
    assert_eq!(summary["overall_stats"]["total_correct"], 0);
}

#[tokio::test]
async fn test_save_score_table_accepts_pair_arrays() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    // Game client sends each result as [correct, selected]
    let request = json!({
        "round": 2,
        "results": [["happy", "happy"], ["sad", "angry"], ["Surprised", "fear"]]
    });
    let (status, body) = post_json(&app, "/save_score_table", request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Saved");

    let (_, summary) = get(&app, "/api/emotion_summary").await;
    assert_eq!(summary["overall_stats"]["total_questions"], 3);
    assert_eq!(summary["overall_stats"]["total_correct"], 1);
    assert_eq!(summary["totals"]["sadness"], 1);
    assert_eq!(summary["totals"]["surprise"], 1);

    let (_, feedback) = get(&app, "/get_feedback_all").await;
    assert_eq!(feedback["stats"]["sadness"]["wrong"], 1);
    assert_eq!(feedback["stats"]["happy"]["correct"], 1);
}

#[tokio::test]
async fn test_save_score_table_rejects_malformed_requests() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let bad_bodies = [
        json!({ "round": "one", "results": [] }).to_string(),
        json!({ "round": 1 }).to_string(),
        json!({ "round": 1, "results": [{ "expected": "happy" }] }).to_string(),
        "{ not json".to_string(),
    ];

    for body in bad_bodies {
        let (status, response) = post_json(&app, "/save_score_table", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} was accepted", body);
        assert_eq!(response["error"]["code"], "BAD_REQUEST");
    }

    // Nothing was persisted
    let (_, summary) = get(&app, "/api/emotion_summary").await;
    assert_eq!(summary["status"], "no_data");
}

#[tokio::test]
async fn test_emotion_summary_no_data_then_data() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let (status, body) = get(&app, "/api/emotion_summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_data");
    assert!(body["message"].is_string());

    let request = json!({
        "round": 1,
        "results": [
            { "expected": "happy", "chosen": "happy" },
            { "expected": "sad", "chosen": "angry" }
        ]
    });
    post_json(&app, "/save_score_table", request.to_string()).await;

    let (status, body) = get(&app, "/api/emotion_summary").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("status").is_none());

    let emotions: Vec<&str> = body["emotions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let happy = emotions.iter().position(|e| *e == "happy").unwrap();
    let sadness = emotions.iter().position(|e| *e == "sadness").unwrap();
    let angry = emotions.iter().position(|e| *e == "angry").unwrap();

    assert_eq!(body["matrix"][happy][happy], 1);
    assert_eq!(body["matrix"][sadness][angry], 1);
    assert_eq!(body["overall_stats"]["overall_accuracy"], 50.0);
    assert_eq!(body["accuracies"]["happy"], 100.0);
    assert_eq!(body["totals"]["fear"], 0);
    assert_eq!(body["user_direction_vector"][angry], 1.0);
    assert_eq!(body["data_points"], 1);
    assert_eq!(body["skipped_artifacts"], 0);
    assert_eq!(body["strengths"], json!(["happy"]));
    assert_eq!(body["weaknesses"], json!(["sadness"]));
}

#[tokio::test]
async fn test_feedback_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let (status, body) = get(&app, "/get_feedback_all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 0);
    assert_eq!(body["stats"], json!({}));

    let request = json!({
        "round": 1,
        "results": [
            { "expected": "fear", "chosen": "surprise" },
            { "expected": "fear", "chosen": "fear" },
            { "expected": "happy", "chosen": "happy" }
        ]
    });
    post_json(&app, "/save_score_table", request.to_string()).await;

    let (status, body) = get(&app, "/get_feedback_all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(body["stats"]["fear"]["correct"], 1);
    assert_eq!(body["stats"]["fear"]["wrong"], 1);
    assert_eq!(body["stats"]["fear"]["total"], 2);
    assert_eq!(body["stats"]["happy"]["wrong"], 0);
    assert_eq!(body["stats"]["angry"]["wrong"], 0);
    assert_eq!(body["stats"]["fear"]["accuracy"], 50.0);

    let text = body["feedback"].as_str().unwrap();
    assert!(text.contains("Practice fear a bit more"));
    assert!(!text.contains("Practice happy"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir);

    let (status, _) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
