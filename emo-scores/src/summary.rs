//! Summary service: the entry point for persisting rounds and aggregating them
//!
//! Every `summarize` call rescans the store and rebuilds the matrix from the
//! raw labels. Nothing is cached, so a changed label table or a late-arriving
//! artifact is picked up on the next call.

use crate::labels::LabelNormalizer;
use crate::matrix::{ConfusionMatrix, MatrixBuilder};
use crate::stats::{StatisticsEngine, Stats};
use crate::store::{RecordStore, ResultRecord, RoundBatch, StoreError, StoredLocation};
use tracing::{debug, info};

/// Aggregate view over every stored round
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionSummary {
    /// Canonical labels in matrix order
    pub labels: Vec<String>,
    pub matrix: ConfusionMatrix,
    pub stats: Stats,
    /// Artifacts that contributed to this summary
    pub data_points: usize,
    /// Artifacts skipped as unreadable
    pub skipped_artifacts: usize,
}

/// Result of an aggregation request
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Summary(EmotionSummary),
    /// No recognized pair exists yet
    NoData,
}

impl SummaryOutcome {
    pub fn summary(&self) -> Option<&EmotionSummary> {
        match self {
            SummaryOutcome::Summary(summary) => Some(summary),
            SummaryOutcome::NoData => None,
        }
    }
}

pub struct SummaryService {
    store: RecordStore,
    normalizer: LabelNormalizer,
    engine: StatisticsEngine,
}

impl SummaryService {
    pub fn new(store: RecordStore, normalizer: LabelNormalizer, engine: StatisticsEngine) -> Self {
        Self {
            store,
            normalizer,
            engine,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn normalizer(&self) -> &LabelNormalizer {
        &self.normalizer
    }

    /// Persist the results of one completed round
    ///
    /// Labels are stored verbatim; normalization happens at aggregation time.
    pub fn persist_round(
        &self,
        round: i64,
        results: Vec<ResultRecord>,
    ) -> Result<StoredLocation, StoreError> {
        let batch = RoundBatch::new(round, results);
        let location = self.store.append(&batch)?;
        info!(
            round,
            records = batch.records.len(),
            "Saved round results to {}",
            location.path.display()
        );
        Ok(location)
    }

    /// Rebuild the summary from every stored artifact
    pub fn summarize(&self) -> SummaryOutcome {
        let mut scan = self.store.load_all();
        let matrix = MatrixBuilder::new(&self.normalizer).build(scan.by_ref());

        let data_points = scan.artifacts_loaded();
        let skipped_artifacts = scan.artifacts_skipped();
        debug!(
            data_points,
            skipped_artifacts,
            counted = matrix.total(),
            "Rebuilt emotion matrix"
        );

        if matrix.total() == 0 {
            return SummaryOutcome::NoData;
        }

        let stats = self.engine.derive(&matrix, self.normalizer.names());

        SummaryOutcome::Summary(EmotionSummary {
            labels: self.normalizer.names().to_vec(),
            matrix,
            stats,
            data_points,
            skipped_artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emo_common::config::StoreConfig;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> SummaryService {
        SummaryService::new(
            RecordStore::new(dir.path().join("scores"), &StoreConfig::default()),
            LabelNormalizer::default(),
            StatisticsEngine::default(),
        )
    }

    #[test]
    fn test_empty_store_is_no_data() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(service(&temp_dir).summarize(), SummaryOutcome::NoData);
    }

    #[test]
    fn test_only_unrecognized_labels_is_no_data() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        service
            .persist_round(1, vec![ResultRecord::new("bored", "happy"), ResultRecord::new("x", "y")])
            .unwrap();

        assert!(service.summarize().summary().is_none());
    }

    #[test]
    fn test_persist_then_summarize() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        service
            .persist_round(1, vec![ResultRecord::new("happy", "happy"), ResultRecord::new("sad", "angry")])
            .unwrap();

        let outcome = service.summarize();
        let summary = outcome.summary().unwrap();

        assert_eq!(summary.data_points, 1);
        assert_eq!(summary.skipped_artifacts, 0);
        assert_eq!(summary.matrix.total(), 2);
        assert_eq!(summary.stats.overall.accuracy, 50.0);
        assert_eq!(summary.labels, service.normalizer().names());
    }
}
