//! Plain-text progress feedback rendered from a summary

use crate::summary::SummaryOutcome;

/// Labels below this accuracy (percent) get a practice recommendation
pub const TRAINING_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub text: String,
    pub overall_accuracy: f64,
    pub total_questions: u64,
}

pub fn render(outcome: &SummaryOutcome) -> Feedback {
    let summary = match outcome.summary() {
        Some(summary) => summary,
        None => {
            return Feedback {
                text: "No rounds recorded yet. Play a few rounds of the emotion game and your progress will show up here."
                    .to_string(),
                overall_accuracy: 0.0,
                total_questions: 0,
            }
        }
    };

    let overall = &summary.stats.overall;
    let mut lines = Vec::new();

    let tier = if overall.accuracy >= 80.0 {
        "Excellent work!"
    } else if overall.accuracy >= TRAINING_THRESHOLD {
        "Good progress!"
    } else {
        "Keep practicing, every round helps."
    };
    lines.push(format!(
        "You answered {} questions with {:.1}% accuracy. {}",
        overall.total_questions, overall.accuracy, tier
    ));

    if !summary.stats.strengths.is_empty() {
        lines.push(format!(
            "You are great at recognizing: {}.",
            summary.stats.strengths.join(", ")
        ));
    }

    let practice: Vec<String> = summary
        .stats
        .per_label
        .iter()
        .filter(|s| s.total > 0 && s.accuracy < TRAINING_THRESHOLD)
        .map(|s| {
            format!(
                "Practice {} a bit more: {:.1}% so far ({}/{} correct).",
                s.label, s.accuracy, s.correct, s.total
            )
        })
        .collect();

    if practice.is_empty() {
        lines.push(format!(
            "All practiced emotions are above {:.0}% accuracy. Keep it up!",
            TRAINING_THRESHOLD
        ));
    } else {
        lines.extend(practice);
    }

    Feedback {
        text: lines.join("\n"),
        overall_accuracy: overall.accuracy,
        total_questions: overall.total_questions,
    }
}
