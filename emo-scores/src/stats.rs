//! Accuracy statistics derived from a confusion matrix
//!
//! Percentages are raw `f64` in 0-100; rounding belongs to whoever renders them.

use crate::matrix::ConfusionMatrix;
use emo_common::config::SummaryConfig;

/// Per-label results
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStats {
    pub label: String,
    /// Times the label was shown and picked
    pub correct: u64,
    /// Times the label was shown
    pub total: u64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub total_questions: u64,
    pub total_correct: u64,
    pub accuracy: f64,
}

/// Everything derived from one matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    /// In canonical label order
    pub per_label: Vec<LabelStats>,
    pub overall: OverallStats,
    /// V0, all ones
    pub base_vector: Vec<f64>,
    /// V0 · M: how often each label was picked, right or wrong
    pub direction_vector: Vec<f64>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// `part / whole * 100`, or 0 for an empty whole
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Row vector times matrix
///
/// `base.len()` must equal the matrix dimension.
pub fn project(base: &[f64], matrix: &ConfusionMatrix) -> Vec<f64> {
    let n = matrix.size();
    debug_assert_eq!(base.len(), n, "base vector length must match matrix dimension");
    (0..n)
        .map(|j| (0..n).map(|i| base[i] * matrix.get(i, j) as f64).sum())
        .collect()
}

pub struct StatisticsEngine {
    strength_threshold: f64,
    weakness_threshold: f64,
}

impl StatisticsEngine {
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            strength_threshold: config.strength_threshold,
            weakness_threshold: config.weakness_threshold,
        }
    }

    /// Derive statistics; `labels` names the matrix rows in order
    ///
    /// `labels.len()` must equal the matrix dimension.
    pub fn derive(&self, matrix: &ConfusionMatrix, labels: &[String]) -> Stats {
        let n = matrix.size();
        debug_assert_eq!(labels.len(), n, "one label per matrix row");

        let per_label: Vec<LabelStats> = (0..n)
            .map(|i| {
                let total: u64 = matrix.row(i).iter().sum();
                let correct = matrix.get(i, i);
                LabelStats {
                    label: labels[i].clone(),
                    correct,
                    total,
                    accuracy: percent(correct, total),
                }
            })
            .collect();

        let total_questions = matrix.total();
        let total_correct = matrix.trace();

        let base_vector = vec![1.0; n];
        let direction_vector = project(&base_vector, matrix);

        // Unobserved labels are neither strong nor weak
        let observed = || per_label.iter().filter(|s| s.total > 0);
        let strengths = observed()
            .filter(|s| s.accuracy >= self.strength_threshold)
            .map(|s| s.label.clone())
            .collect();
        let weaknesses = observed()
            .filter(|s| s.accuracy <= self.weakness_threshold)
            .map(|s| s.label.clone())
            .collect();

        Stats {
            overall: OverallStats {
                total_questions,
                total_correct,
                accuracy: percent(total_correct, total_questions),
            },
            per_label,
            base_vector,
            direction_vector,
            strengths,
            weaknesses,
        }
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(&SummaryConfig::default())
    }
}
