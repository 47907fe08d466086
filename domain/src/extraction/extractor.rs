//! Reply extraction: turning a free-form model reply into a verdict.
//!
//! Every operation runs the same scan over the prepared reply (placeholder
//! examples removed, cloze markup unwrapped). Fence markers are left in
//! place: the brace scanner skips string contents and text outside braces,
//! so fenced and bare objects are found alike and a fence quoted inside a
//! value survives byte for byte.
//!
//! 1. If the reply ends with a JSON object that satisfies the predicate, it
//!    is the answer (fast path; it is always the last candidate anyway).
//! 2. Otherwise every balanced `{...}` span is tried from the end of the
//!    text backwards. A span that fails is searched for nested objects
//!    before moving on. The first hit from the end wins.
//! 3. Only if nothing qualifies is the scan repeated with every fence
//!    marker stripped, for replies that put fences inside the braces.
//!
//! A span is tried as strict JSON first and only normalized (quotes,
//! newlines, whitespace) when that parse fails. Spans that still fail, or
//! whose fields don't satisfy the predicate, are skipped. Nothing here
//! returns an error: a reply with no usable object yields `None`.

use super::candidates::{balanced_objects, nested_objects, trailing_object};
use super::normalize::{normalize_candidate, prepare_reply, strip_code_fences};
use crate::review::difficulty::DifficultyLevel;
use crate::review::evaluation::EvaluationRecord;
use serde_json::{Map, Value};
use std::ops::Range;
use tracing::{debug, trace};

const EVALUATION: &str = "evaluation";
const RECOMMENDATION: &str = "recommendation";
const ANSWER: &str = "answer";
const REFERENCE: &str = "reference";

/// Which verdict a caller is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// All four evaluation fields
    FullRecord,
    /// Only the difficulty recommendation
    Recommendation,
}

/// A verdict pulled out of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Record(EvaluationRecord),
    Recommendation(DifficultyLevel),
}

impl Extraction {
    pub fn recommendation(&self) -> DifficultyLevel {
        match self {
            Extraction::Record(record) => record.recommendation,
            Extraction::Recommendation(level) => *level,
        }
    }

    pub fn record(&self) -> Option<&EvaluationRecord> {
        match self {
            Extraction::Record(record) => Some(record),
            Extraction::Recommendation(_) => None,
        }
    }
}

/// The last difficulty recommendation in `reply`.
///
/// Values outside Again/Hard/Good/Easy are treated as absent.
pub fn extract_recommendation(reply: &str) -> Option<DifficultyLevel> {
    scan(reply, recommendation_of)
}

/// The last complete evaluation record in `reply`.
///
/// All four fields must be present and non-blank, and the recommendation
/// must be one of the four levels.
pub fn extract_full_record(reply: &str) -> Option<EvaluationRecord> {
    scan(reply, record_of)
}

/// Run the extraction matching `mode`.
pub fn extract(reply: &str, mode: ExtractionMode) -> Option<Extraction> {
    match mode {
        ExtractionMode::FullRecord => extract_full_record(reply).map(Extraction::Record),
        ExtractionMode::Recommendation => {
            extract_recommendation(reply).map(Extraction::Recommendation)
        }
    }
}

/// Whether `reply` already carries the verdict `mode` waits for.
///
/// Safe to call on every growing prefix of a streamed reply.
pub fn is_response_complete(reply: &str, mode: ExtractionMode) -> bool {
    extract(reply, mode).is_some()
}

// ==================== Scan ====================

fn scan<T>(reply: &str, accept: fn(&Map<String, Value>) -> Option<T>) -> Option<T> {
    let prepared = prepare_reply(reply);
    let found = scan_text(&prepared, accept).or_else(|| {
        let stripped = strip_code_fences(&prepared);
        if stripped == prepared {
            return None;
        }
        trace!("Retrying scan with fence markers stripped");
        scan_text(&stripped, accept)
    });

    if found.is_none() {
        debug!("No acceptable JSON object in reply ({} bytes)", reply.len());
    }
    found
}

fn scan_text<T>(text: &str, accept: fn(&Map<String, Value>) -> Option<T>) -> Option<T> {
    if let Some(span) = trailing_object(text)
        && let Some(found) = try_candidate(&text[span], accept)
    {
        trace!("Trailing object accepted");
        return Some(found);
    }
    last_accepted(text, &balanced_objects(text), accept)
}

fn last_accepted<T>(
    text: &str,
    spans: &[Range<usize>],
    accept: fn(&Map<String, Value>) -> Option<T>,
) -> Option<T> {
    spans.iter().rev().find_map(|span| {
        try_candidate(&text[span.clone()], accept)
            .or_else(|| last_accepted(text, &nested_objects(text, span), accept))
    })
}

fn try_candidate<T>(candidate: &str, accept: fn(&Map<String, Value>) -> Option<T>) -> Option<T> {
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(strict_err) => {
            let normalized = normalize_candidate(candidate);
            match serde_json::from_str::<Value>(&normalized) {
                Ok(value) => value,
                Err(err) => {
                    trace!(
                        "Skipping malformed candidate ({}; after normalization: {}): {}",
                        strict_err,
                        err,
                        candidate
                    );
                    return None;
                }
            }
        }
    };

    let Value::Object(map) = value else {
        return None;
    };
    let accepted = accept(&map);
    if accepted.is_none() {
        trace!("Candidate parsed but rejected: keys {:?}", map.keys().collect::<Vec<_>>());
    }
    accepted
}

// ==================== Predicates ====================

fn recommendation_of(map: &Map<String, Value>) -> Option<DifficultyLevel> {
    map.get(RECOMMENDATION)?.as_str()?.parse().ok()
}

fn record_of(map: &Map<String, Value>) -> Option<EvaluationRecord> {
    let recommendation = recommendation_of(map)?;
    Some(EvaluationRecord::new(
        field_text(map, EVALUATION)?,
        recommendation,
        field_text(map, ANSWER)?,
        field_text(map, REFERENCE)?,
    ))
}

/// A non-blank string field. Models sometimes list answers as an array of
/// strings; those are joined with `", "`.
fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str())
            .collect::<Option<Vec<_>>>()?
            .join(", "),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::difficulty::DifficultyLevel::*;

    const RECORD: &str = r#"{"evaluation": "Correct, and quick.", "recommendation": "Easy", "answer": "Paris", "reference": "Paris has been the capital since 987."}"#;

    // ==================== extract_recommendation ====================

    #[test]
    fn test_single_object() {
        assert_eq!(extract_recommendation(r#"{"recommendation": "Good"}"#), Some(Good));
    }

    #[test]
    fn test_last_object_wins_for_every_pair() {
        for first in DifficultyLevel::ALL {
            for second in DifficultyLevel::ALL {
                let text = format!(
                    "Draft: {{\"recommendation\": \"{first}\"}}\nOn reflection: {{\"recommendation\": \"{second}\"}}"
                );
                assert_eq!(extract_recommendation(&text), Some(second), "{first} then {second}");
            }
        }
    }

    #[test]
    fn test_last_object_wins_across_fenced_and_bare() {
        let fenced_first = "```json\n{\"recommendation\": \"Hard\"}\n```\nActually {\"recommendation\": \"Easy\"} is right.";
        assert_eq!(extract_recommendation(fenced_first), Some(Easy));

        let bare_first = "I thought {\"recommendation\": \"Easy\"}\n```json\n{\"recommendation\": \"Again\"}\n```";
        assert_eq!(extract_recommendation(bare_first), Some(Again));
    }

    #[test]
    fn test_out_of_set_value_is_absent() {
        assert_eq!(extract_recommendation(r#"{"recommendation": "Maybe"}"#), None);
        assert_eq!(extract_recommendation(r#"{"recommendation": "good"}"#), None);
        assert_eq!(extract_recommendation(r#"{"recommendation": 3}"#), None);
    }

    #[test]
    fn test_out_of_set_last_does_not_shadow_valid_earlier() {
        let text = r#"{"recommendation": "Hard"} then {"recommendation": "Maybe"}"#;
        assert_eq!(extract_recommendation(text), Some(Hard));
    }

    #[test]
    fn test_single_quotes() {
        assert_eq!(extract_recommendation("{'recommendation': 'Good'}"), Some(Good));
    }

    #[test]
    fn test_surrounding_whitespace_in_value() {
        assert_eq!(extract_recommendation(r#"{"recommendation": " Easy "}"#), Some(Easy));
    }

    #[test]
    fn test_trailing_comma_is_not_repaired() {
        assert_eq!(extract_recommendation(r#"{"recommendation": "Good",}"#), None);
    }

    #[test]
    fn test_no_object_is_none() {
        assert_eq!(extract_recommendation("I would say Good."), None);
        assert_eq!(extract_recommendation(""), None);
    }

    #[test]
    fn test_nested_object_found_inside_non_json_braces() {
        let text = r#"{ my verdict is {"recommendation": "Hard"} okay }"#;
        assert_eq!(extract_recommendation(text), Some(Hard));
    }

    #[test]
    fn test_placeholder_example_is_ignored() {
        let text = "Reply like this:\n```json\n{\"recommendation\": \"...\"}\n```\nNo decision yet.";
        assert_eq!(extract_recommendation(text), None);
    }

    #[test]
    fn test_cloze_markup_does_not_break_scan() {
        let text = r#"The blank {{c1::Paris}} was answered. {"recommendation": "Good"}"#;
        assert_eq!(extract_recommendation(text), Some(Good));
    }

    #[test]
    fn test_trailing_fast_path_matches_full_scan() {
        let replies = [
            r#"a {"recommendation": "Hard"} b {"recommendation": "Easy"}"#,
            "```json\n{\"recommendation\": \"Again\"}\n```",
            r#"{"recommendation": "Good", "extra": {"recommendation": "Hard"}}"#,
            r#"{"recommendation": "Easy"} {"note": "no verdict"}"#,
            r#"{ {"recommendation": "Hard"} }"#,
        ];
        for reply in replies {
            let text = prepare_reply(reply);
            let full = last_accepted(&text, &balanced_objects(&text), recommendation_of);
            assert_eq!(scan_text(&text, recommendation_of), full, "{reply}");
            assert_eq!(extract_recommendation(reply), full, "{reply}");
        }
    }

    // ==================== extract_full_record ====================

    #[test]
    fn test_record_in_prose_and_fence() {
        let bare = format!("Here is my assessment.\n{RECORD}");
        let fenced = format!("Here is my assessment.\n```json\n{RECORD}\n```\nGood luck!");

        for reply in [RECORD.to_string(), bare, fenced] {
            let record = extract_full_record(&reply).unwrap();
            assert_eq!(record.evaluation, "Correct, and quick.");
            assert_eq!(record.recommendation, Easy);
            assert_eq!(record.answer, "Paris");
            assert_eq!(record.reference, "Paris has been the capital since 987.");
        }
    }

    #[test]
    fn test_fence_inside_value_is_kept() {
        let record = r#"{"evaluation": "Right.", "recommendation": "Good", "answer": "print", "reference": "Run ```python print(1)``` in a shell"}"#;
        let bare = format!("Verdict: {record}");
        let fenced = format!("```json\n{record}\n```");

        for reply in [bare, fenced] {
            let parsed = extract_full_record(&reply).unwrap();
            assert_eq!(parsed.reference, "Run ```python print(1)``` in a shell");
            assert_eq!(parsed.answer, "print");
        }
    }

    #[test]
    fn test_fence_inside_braces_falls_back_to_stripped_scan() {
        let reply = "{```json\n\"recommendation\": \"Hard\"\n```}";
        assert_eq!(extract_recommendation(reply), Some(Hard));
    }

    #[test]
    fn test_last_full_record_wins() {
        let early = r#"{"evaluation": "Draft.", "recommendation": "Hard", "answer": "Lyon", "reference": "first"}"#;
        let late = r#"{"evaluation": "Final.", "recommendation": "Good", "answer": "Paris", "reference": "second"}"#;
        let replies = [
            format!("{early}\nOn reflection:\n{late}"),
            format!("```json\n{early}\n```\nRevised: {late}"),
            format!("First try {early}\n```json\n{late}\n```"),
            format!("```json\n{early}\n```\n```json\n{late}\n```\nDone."),
        ];

        for reply in &replies {
            let record = extract_full_record(reply).unwrap();
            assert_eq!(record.evaluation, "Final.", "{reply}");
            assert_eq!(record.recommendation, Good);
            assert_eq!(record.reference, "second");
        }
    }

    #[test]
    fn test_later_recommendation_only_object_is_not_a_record() {
        let reply = format!("{RECORD}\nIf unsure: {{\"recommendation\": \"Again\"}}");

        // The later object lacks three fields, so the last qualifying record stays.
        let record = extract_full_record(&reply).unwrap();
        assert_eq!(record.recommendation, Easy);
        assert_eq!(record.answer, "Paris");

        // A recommendation-only scan takes the later object.
        assert_eq!(extract_recommendation(&reply), Some(Again));
    }

    #[test]
    fn test_record_requires_all_fields() {
        let missing = r#"{"evaluation": "ok", "recommendation": "Good", "answer": "x"}"#;
        assert!(extract_full_record(missing).is_none());

        let blank = r#"{"evaluation": "  ", "recommendation": "Good", "answer": "x", "reference": "y"}"#;
        assert!(extract_full_record(blank).is_none());

        let bad_level = r#"{"evaluation": "ok", "recommendation": "Fine", "answer": "x", "reference": "y"}"#;
        assert!(extract_full_record(bad_level).is_none());
    }

    #[test]
    fn test_record_answer_array_is_joined() {
        let reply = r#"{"evaluation": "ok", "recommendation": "Good", "answer": ["Seoul", "Busan"], "reference": "r"}"#;
        assert_eq!(extract_full_record(reply).unwrap().answer, "Seoul, Busan");
    }

    #[test]
    fn test_record_with_newlines_inside_values() {
        let reply = "{\"evaluation\": \"Mostly right\nbut slow\", \"recommendation\": \"Hard\", \"answer\": \"Paris\", \"reference\": \"ref\"}";
        let record = extract_full_record(reply).unwrap();
        assert_eq!(record.evaluation, "Mostly right but slow");
        assert_eq!(record.recommendation, Hard);
    }

    #[test]
    fn test_partial_record_does_not_satisfy_full_mode() {
        let reply = r#"{"recommendation": "Good"}"#;
        assert!(extract_full_record(reply).is_none());
        assert!(!is_response_complete(reply, ExtractionMode::FullRecord));
        assert!(is_response_complete(reply, ExtractionMode::Recommendation));
    }

    // ==================== is_response_complete ====================

    #[test]
    fn test_completeness_is_monotonic_over_prefixes() {
        let full = format!("Thinking it over... {RECORD} Hope that helps, see you next review.");
        let mut seen_complete = false;
        for end in (0..=full.len()).filter(|&i| full.is_char_boundary(i)) {
            let complete = is_response_complete(&full[..end], ExtractionMode::FullRecord);
            assert!(!(seen_complete && !complete), "flipped back at prefix {end}");
            seen_complete |= complete;
        }
        assert!(seen_complete);
    }

    #[test]
    fn test_streamed_chunks_complete_on_last() {
        let chunks = ["Some reasoning... ", "more text {\"recommendation\"", ": \"Good\"}"];
        let mut buffer = String::new();
        let mut results = Vec::new();
        for chunk in chunks {
            buffer.push_str(chunk);
            results.push(is_response_complete(&buffer, ExtractionMode::Recommendation));
        }
        assert_eq!(results, vec![false, false, true]);
    }

    #[test]
    fn test_extraction_accessors() {
        let record = extract(RECORD, ExtractionMode::FullRecord).unwrap();
        assert_eq!(record.recommendation(), Easy);
        assert!(record.record().is_some());

        let level = extract(RECORD, ExtractionMode::Recommendation).unwrap();
        assert_eq!(level, Extraction::Recommendation(Easy));
        assert!(level.record().is_none());
    }
}
