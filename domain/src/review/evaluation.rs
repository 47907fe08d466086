//! Evaluation record value object

use super::difficulty::DifficultyLevel;
use serde::{Deserialize, Serialize};

/// The structured verdict on one answer.
///
/// Only built by the reply extractor once all four fields were found
/// non-empty, so holders never see a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation: String,
    pub recommendation: DifficultyLevel,
    pub answer: String,
    pub reference: String,
}

impl EvaluationRecord {
    pub fn new(
        evaluation: impl Into<String>,
        recommendation: DifficultyLevel,
        answer: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            evaluation: evaluation.into(),
            recommendation,
            answer: answer.into(),
            reference: reference.into(),
        }
    }

    /// Split the `answer` field into its individual accepted answers.
    ///
    /// Models often list answers as bullets or one per line; commas and
    /// newlines both separate items and leading `•`, `-` or `*` markers are
    /// dropped.
    pub fn answer_items(&self) -> Vec<String> {
        self.answer
            .split([',', '\n'])
            .map(|part| {
                part.trim()
                    .trim_start_matches(['•', '-', '*'])
                    .trim_start()
                    .to_string()
            })
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// The answer items joined back as a single comma-separated line.
    pub fn answer_list(&self) -> String {
        self.answer_items().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(answer: &str) -> EvaluationRecord {
        EvaluationRecord::new("ok", DifficultyLevel::Good, answer, "ref")
    }

    #[test]
    fn test_answer_list_from_bullets() {
        let r = record("- going to\n- gonna\n• will");
        assert_eq!(r.answer_list(), "going to, gonna, will");
    }

    #[test]
    fn test_answer_list_from_commas() {
        let r = record("Paris,  Paname ,");
        assert_eq!(r.answer_items(), vec!["Paris", "Paname"]);
    }

    #[test]
    fn test_answer_list_keeps_single_answer() {
        assert_eq!(record("Paris").answer_list(), "Paris");
    }
}
