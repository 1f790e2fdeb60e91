//! End-to-end tests for persisting rounds and aggregating them
//!
//! Each test works in its own temporary root folder.

mod helpers;

use emo_scores::summary::SummaryOutcome;
use helpers::{records, test_service, LogCapture};
use tempfile::TempDir;
use tracing::Level;

fn index_of(labels: &[String], name: &str) -> usize {
    labels.iter().position(|l| l == name).unwrap()
}

#[test]
fn test_no_artifacts_is_no_data() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());

    assert_eq!(service.summarize(), SummaryOutcome::NoData);
    // Still nothing once the directory exists but is empty
    std::fs::create_dir_all(service.store().dir()).unwrap();
    assert_eq!(service.summarize(), SummaryOutcome::NoData);
}

#[test]
fn test_single_round_with_synonym() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    service
        .persist_round(1, records(&[("happy", "happy"), ("sad", "angry")]))
        .unwrap();

    let outcome = service.summarize();
    let summary = outcome.summary().expect("summary expected");
    let labels = &summary.labels;

    let happy = index_of(labels, "happy");
    let sadness = index_of(labels, "sadness");
    let angry = index_of(labels, "angry");

    for row in 0..labels.len() {
        for col in 0..labels.len() {
            let expected = match (row, col) {
                (r, c) if r == happy && c == happy => 1,
                (r, c) if r == sadness && c == angry => 1,
                _ => 0,
            };
            assert_eq!(summary.matrix.get(row, col), expected, "cell ({}, {})", row, col);
        }
    }
    assert_eq!(summary.stats.overall.accuracy, 50.0);
}

#[test]
fn test_corrupt_artifact_skipped_and_logged() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    service
        .persist_round(1, records(&[("happy", "happy"), ("fear", "fear")]))
        .unwrap();
    service
        .persist_round(2, records(&[("angry", "disgust")]))
        .unwrap();
    std::fs::write(
        service.store().dir().join("round3_20250101_000000.json"),
        b"\x00\x01 definitely not json",
    )
    .unwrap();

    let (outcome, logs) = LogCapture::capture(|| service.summarize());
    let summary = outcome.summary().expect("valid artifacts still summarized");

    assert_eq!(summary.data_points, 2);
    assert_eq!(summary.skipped_artifacts, 1);
    assert_eq!(summary.stats.overall.total_questions, 3);
    assert_eq!(summary.stats.overall.total_correct, 2);

    let warnings = logs.matching(Level::WARN, "round3_20250101_000000.json");
    assert_eq!(warnings.len(), 1, "expected one warning, got {:?}", logs.records());
}

#[test]
fn test_unobserved_label_reported_as_zero() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    service
        .persist_round(1, records(&[("happy", "happy"), ("angry", "sad"), ("neutral", "neutral")]))
        .unwrap();

    let outcome = service.summarize();
    let summary = outcome.summary().unwrap();
    let fear = summary
        .stats
        .per_label
        .iter()
        .find(|s| s.label == "fear")
        .unwrap();

    assert_eq!(fear.total, 0);
    assert_eq!(fear.accuracy, 0.0);
    assert!(!summary.stats.strengths.contains(&"fear".to_string()));
    assert!(!summary.stats.weaknesses.contains(&"fear".to_string()));
}

#[test]
fn test_round_trip_counts_only_recognized_records() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    let round = records(&[
        ("Happy", "happy"),
        ("SURPRISED", "fear"),
        ("bored", "happy"),
        ("disgust", ""),
        ("joy", "sadness"),
    ]);
    service.persist_round(4, round).unwrap();

    let outcome = service.summarize();
    let summary = outcome.summary().unwrap();

    assert_eq!(summary.matrix.total(), 3);
    let happy = index_of(&summary.labels, "happy");
    let surprise = index_of(&summary.labels, "surprise");
    let fear = index_of(&summary.labels, "fear");
    let sadness = index_of(&summary.labels, "sadness");
    assert_eq!(summary.matrix.get(happy, happy), 1);
    assert_eq!(summary.matrix.get(surprise, fear), 1);
    assert_eq!(summary.matrix.get(happy, sadness), 1);
}

#[test]
fn test_summarize_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    service
        .persist_round(1, records(&[("happy", "happy"), ("sad", "angry"), ("fear", "surprise")]))
        .unwrap();
    service
        .persist_round(2, records(&[("angry", "angry"), ("disgust", "disgust")]))
        .unwrap();

    let first = service.summarize();
    let second = service.summarize();
    assert_eq!(first, second);
}

#[test]
fn test_rounds_accumulate_across_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());

    for round in 1..=5 {
        service
            .persist_round(round, records(&[("happy", "happy"), ("fear", "angry")]))
            .unwrap();
    }

    let outcome = service.summarize();
    let summary = outcome.summary().unwrap();

    assert_eq!(summary.data_points, 5);
    assert_eq!(summary.stats.overall.total_questions, 10);
    assert_eq!(summary.stats.overall.accuracy, 50.0);
    assert_eq!(summary.stats.strengths, vec!["happy"]);
    assert_eq!(summary.stats.weaknesses, vec!["fear"]);
}

#[test]
fn test_matrix_invariants_over_mixed_corpus() {
    let temp_dir = TempDir::new().unwrap();
    let service = test_service(temp_dir.path());
    let tokens = ["angry", "Disgusted", "fear", "happy", "sad", "surprised", "neutral", "meh"];

    // Deterministic spread of every token pairing
    let mut recognized = 0u64;
    for (round, expected) in tokens.iter().enumerate() {
        let batch: Vec<(&str, &str)> = tokens.iter().map(|chosen| (*expected, *chosen)).collect();
        recognized += batch
            .iter()
            .filter(|(e, c)| {
                service.normalizer().normalize(e).is_some() && service.normalizer().normalize(c).is_some()
            })
            .count() as u64;
        service.persist_round(round as i64, records(&batch)).unwrap();
    }

    let outcome = service.summarize();
    let summary = outcome.summary().unwrap();
    let stats = &summary.stats;

    assert_eq!(summary.matrix.total(), recognized);
    assert_eq!(stats.overall.total_questions, recognized);

    let direction_sum: f64 = stats.direction_vector.iter().sum();
    assert_eq!(direction_sum, summary.matrix.total() as f64);

    for s in &stats.per_label {
        if s.total == 0 {
            assert_eq!(s.accuracy, 0.0);
        } else {
            assert!((0.0..=100.0).contains(&s.accuracy));
        }
    }
}
