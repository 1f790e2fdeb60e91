//! Test helper utilities for emo-scores

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::LogCapture;

use emo_common::config::{StoreConfig, SummaryConfig};
use emo_scores::labels::LabelNormalizer;
use emo_scores::stats::StatisticsEngine;
use emo_scores::store::{RecordStore, ResultRecord};
use emo_scores::summary::SummaryService;
use std::path::Path;

/// Summary service over `<root>/scores` with default configuration
pub fn test_service(root: &Path) -> SummaryService {
    SummaryService::new(
        RecordStore::new(root.join("scores"), &StoreConfig::default()),
        LabelNormalizer::default(),
        StatisticsEngine::new(&SummaryConfig::default()),
    )
}

/// Build records from (expected, chosen) string pairs
pub fn records(pairs: &[(&str, &str)]) -> Vec<ResultRecord> {
    pairs.iter().map(|(e, c)| ResultRecord::new(*e, *c)).collect()
}
