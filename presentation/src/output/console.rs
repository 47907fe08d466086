//! Console output formatter for review results

use checker_domain::{
    DifficultyLevel, ErrorKind, EvaluationRecord, Extraction, PromptPair, RequestKind,
    help_text_for,
};
use colored::{ColoredString, Colorize};
use serde_json::json;

/// Formats review results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colored output on or off for the whole process
    pub fn set_color(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    /// Format an extracted verdict
    pub fn format_extraction(extraction: &Extraction) -> String {
        match extraction {
            Extraction::Record(record) => Self::format_record(record),
            Extraction::Recommendation(level) => Self::format_recommendation(*level),
        }
    }

    /// Format a full evaluation record
    pub fn format_record(record: &EvaluationRecord) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Evaluation"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Recommendation:".cyan().bold(),
            Self::level(record.recommendation)
        ));

        output.push_str(&format!("{}\n", "Evaluation:".cyan().bold()));
        output.push_str(&Self::indent(&record.evaluation, "  "));
        output.push_str("\n\n");

        output.push_str(&format!("{}\n", "Correct answers:".cyan().bold()));
        for item in record.answer_items() {
            output.push_str(&format!("  * {}\n", item));
        }

        output.push_str(&format!("\n{}\n", "Reference:".cyan().bold()));
        output.push_str(&Self::indent(&record.reference, "  "));
        output.push('\n');

        output.push_str(&Self::footer());
        output
    }

    /// Format a bare recommendation
    pub fn format_recommendation(level: DifficultyLevel) -> String {
        format!("{} {}", "Recommendation:".cyan().bold(), Self::level(level))
    }

    /// Format a prompt pair
    pub fn format_prompt(prompt: &PromptPair) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            Self::section_header("System"),
            prompt.system,
            Self::section_header("User"),
            prompt.user
        )
    }

    /// Format a free-text follow-up reply
    pub fn format_reply(kind: RequestKind, reply: &str) -> String {
        format!(
            "{}\n{}\n",
            format!("── {} ──", kind).yellow().bold(),
            reply.trim_end()
        )
    }

    /// Format accepted cloze answers
    pub fn format_answers(answers: &[String]) -> String {
        if answers.is_empty() {
            return format!("{}", "(no answer for this ordinal)".dimmed());
        }
        answers
            .iter()
            .map(|a| format!("  * {}", a))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format an error with its headline and help text
    pub fn format_error(kind: ErrorKind, detail: &str) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), kind.user_message());
        if !detail.is_empty() && detail != kind.user_message() {
            output.push_str(&format!("  {}\n", detail.dimmed()));
        }
        output.push_str(&format!("{}", help_text_for(kind).yellow()));
        output
    }

    // ==================== JSON ====================

    /// Format an extracted verdict as JSON
    pub fn format_extraction_json(extraction: &Extraction) -> String {
        let value = match extraction {
            Extraction::Record(record) => serde_json::to_value(record).unwrap_or_default(),
            Extraction::Recommendation(level) => json!({ "recommendation": level }),
        };
        Self::pretty(&value)
    }

    pub fn format_prompt_json(prompt: &PromptPair) -> String {
        serde_json::to_string_pretty(prompt).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_reply_json(kind: RequestKind, reply: &str) -> String {
        Self::pretty(&json!({ "kind": kind, "reply": reply }))
    }

    pub fn format_answers_json(answers: &[String]) -> String {
        Self::pretty(&json!({ "accepted_answers": answers }))
    }

    pub fn format_error_json(kind: ErrorKind, detail: &str) -> String {
        Self::pretty(&json!({
            "error": kind,
            "message": kind.user_message(),
            "detail": detail,
            "help": help_text_for(kind),
        }))
    }

    // ==================== Helpers ====================

    fn pretty(value: &serde_json::Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn level(level: DifficultyLevel) -> ColoredString {
        match level {
            DifficultyLevel::Again => level.as_str().red().bold(),
            DifficultyLevel::Hard => level.as_str().yellow().bold(),
            DifficultyLevel::Good => level.as_str().green().bold(),
            DifficultyLevel::Easy => level.as_str().blue().bold(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        ConsoleFormatter::set_color(false);
        f()
    }

    fn record() -> EvaluationRecord {
        EvaluationRecord::new(
            "Correct, and quick.",
            DifficultyLevel::Easy,
            "- going to\n- gonna",
            "Cambridge Grammar",
        )
    }

    #[test]
    fn test_record_lists_answers() {
        let output = plain(|| ConsoleFormatter::format_record(&record()));
        assert!(output.contains("Recommendation: Easy"));
        assert!(output.contains("  * going to\n  * gonna"));
        assert!(output.contains("  Cambridge Grammar"));
    }

    #[test]
    fn test_extraction_json_keeps_exact_spelling() {
        let json = ConsoleFormatter::format_extraction_json(&Extraction::Recommendation(
            DifficultyLevel::Again,
        ));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recommendation"], "Again");

        let json = ConsoleFormatter::format_extraction_json(&Extraction::Record(record()));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recommendation"], "Easy");
        assert_eq!(value["reference"], "Cambridge Grammar");
    }

    #[test]
    fn test_error_includes_help_text() {
        let output = plain(|| ConsoleFormatter::format_error(ErrorKind::RateLimited, "429"));
        assert!(output.contains(ErrorKind::RateLimited.user_message()));
        assert!(output.contains("429"));
        assert!(output.contains(help_text_for(ErrorKind::RateLimited)));
    }

    #[test]
    fn test_error_json() {
        let json = ConsoleFormatter::format_error_json(ErrorKind::ExtractionMiss, "");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "extraction_miss");
    }

    #[test]
    fn test_empty_answers() {
        let output = plain(|| ConsoleFormatter::format_answers(&[]));
        assert_eq!(output, "(no answer for this ordinal)");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
