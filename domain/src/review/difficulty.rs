//! Review difficulty value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four answer buttons of the spaced-repetition scheduler.
///
/// The spellings are the contract with the scheduler, which matches on
/// literal equality: `Again`, `Hard`, `Good`, `Easy` (case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Again,
    Hard,
    Good,
    Easy,
}

impl DifficultyLevel {
    /// All levels, hardest first.
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Again,
        DifficultyLevel::Hard,
        DifficultyLevel::Good,
        DifficultyLevel::Easy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Again => "Again",
            DifficultyLevel::Hard => "Hard",
            DifficultyLevel::Good => "Good",
            DifficultyLevel::Easy => "Easy",
        }
    }

    /// Scheduler ease (Again=1 ... Easy=4).
    pub fn ease(&self) -> u8 {
        match self {
            DifficultyLevel::Again => 1,
            DifficultyLevel::Hard => 2,
            DifficultyLevel::Good => 3,
            DifficultyLevel::Easy => 4,
        }
    }

    /// Inverse of [`ease`](Self::ease).
    pub fn from_ease(ease: u8) -> Option<Self> {
        match ease {
            1 => Some(DifficultyLevel::Again),
            2 => Some(DifficultyLevel::Hard),
            3 => Some(DifficultyLevel::Good),
            4 => Some(DifficultyLevel::Easy),
            _ => None,
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    /// Surrounding whitespace is ignored; the word itself is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Again" => Ok(DifficultyLevel::Again),
            "Hard" => Ok(DifficultyLevel::Hard),
            "Good" => Ok(DifficultyLevel::Good),
            "Easy" => Ok(DifficultyLevel::Easy),
            other => Err(format!("not a difficulty level: {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_mapping() {
        assert_eq!(DifficultyLevel::Again.ease(), 1);
        assert_eq!(DifficultyLevel::Hard.ease(), 2);
        assert_eq!(DifficultyLevel::Good.ease(), 3);
        assert_eq!(DifficultyLevel::Easy.ease(), 4);
        for level in DifficultyLevel::ALL {
            assert_eq!(DifficultyLevel::from_ease(level.ease()), Some(level));
        }
        assert_eq!(DifficultyLevel::from_ease(0), None);
        assert_eq!(DifficultyLevel::from_ease(5), None);
    }

    #[test]
    fn test_parse_exact_spelling() {
        assert_eq!("Good".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Good));
        assert_eq!(" Easy\n".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Easy));
    }

    #[test]
    fn test_parse_rejects_other_values() {
        assert!("good".parse::<DifficultyLevel>().is_err());
        assert!("Maybe".parse::<DifficultyLevel>().is_err());
        assert!("None".parse::<DifficultyLevel>().is_err());
        assert!("".parse::<DifficultyLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_scheduler_spelling() {
        let json = serde_json::to_string(&DifficultyLevel::Hard).unwrap();
        assert_eq!(json, "\"Hard\"");
        let back: DifficultyLevel = serde_json::from_str("\"Again\"").unwrap();
        assert_eq!(back, DifficultyLevel::Again);
    }
}
