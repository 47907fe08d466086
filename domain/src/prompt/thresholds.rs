//! Response-time thresholds of the grading rubric

use crate::core::error::DomainError;
use crate::review::difficulty::DifficultyLevel;
use serde::{Deserialize, Serialize};

/// Seconds separating the time bands of the rubric.
///
/// `elapsed < easy` is Easy, `easy <= elapsed < good` is Good,
/// `good <= elapsed < hard` is Hard and `elapsed >= hard` is Again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeThresholds {
    pub easy: u64,
    pub good: u64,
    pub hard: u64,
}

impl Default for TimeThresholds {
    fn default() -> Self {
        Self {
            easy: 5,
            good: 40,
            hard: 60,
        }
    }
}

impl TimeThresholds {
    /// Build thresholds, rejecting zero or out-of-order bands.
    pub fn new(easy: u64, good: u64, hard: u64) -> Result<Self, DomainError> {
        let thresholds = Self { easy, good, hard };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.easy == 0 {
            return Err(DomainError::InvalidThresholds(
                "easy threshold must be greater than 0".to_string(),
            ));
        }
        if !(self.easy <= self.good && self.good <= self.hard) {
            return Err(DomainError::InvalidThresholds(format!(
                "expected easy <= good <= hard, got {} / {} / {}",
                self.easy, self.good, self.hard
            )));
        }
        Ok(())
    }

    /// The recommendation implied by time alone, for a semantically correct answer.
    pub fn classify(&self, elapsed_seconds: u64) -> DifficultyLevel {
        if elapsed_seconds < self.easy {
            DifficultyLevel::Easy
        } else if elapsed_seconds < self.good {
            DifficultyLevel::Good
        } else if elapsed_seconds < self.hard {
            DifficultyLevel::Hard
        } else {
            DifficultyLevel::Again
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_band_edges() {
        let t = TimeThresholds::new(5, 15, 50).unwrap();
        assert_eq!(t.classify(0), DifficultyLevel::Easy);
        assert_eq!(t.classify(4), DifficultyLevel::Easy);
        assert_eq!(t.classify(5), DifficultyLevel::Good);
        assert_eq!(t.classify(14), DifficultyLevel::Good);
        assert_eq!(t.classify(15), DifficultyLevel::Hard);
        assert_eq!(t.classify(49), DifficultyLevel::Hard);
        assert_eq!(t.classify(50), DifficultyLevel::Again);
        assert_eq!(t.classify(500), DifficultyLevel::Again);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(TimeThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_unordered() {
        assert!(TimeThresholds::new(10, 5, 50).is_err());
        assert!(TimeThresholds::new(5, 50, 40).is_err());
        assert!(TimeThresholds::new(0, 5, 10).is_err());
    }

    #[test]
    fn test_equal_bands_allowed() {
        let t = TimeThresholds::new(5, 5, 5).unwrap();
        assert_eq!(t.classify(4), DifficultyLevel::Easy);
        assert_eq!(t.classify(5), DifficultyLevel::Again);
    }
}
