//! Normalization passes applied before JSON parsing.
//!
//! Two short pipelines of pure `&str -> String` functions:
//!
//! | Stage | Pass | Effect |
//! |-------|------|--------|
//! | reply | [`remove_placeholder_blocks`] | drops fenced example JSON whose values are `"..."` |
//! | reply | [`unwrap_cloze_markup`] | `{{c1::Paris::hint}}` → `Paris` |
//! | reply (fallback) | [`strip_code_fences`] | removes ```` ``` ```` / ```` ```json ```` markers |
//! | candidate | [`normalize_quotes`] | `'key': 'value'` → `"key": "value"` |
//! | candidate | [`collapse_newlines`] | literal line breaks → spaces |
//! | candidate | [`collapse_whitespace`] | runs of whitespace → one space |
//!
//! The candidate pipeline only runs after a strict parse of the raw
//! candidate failed, so well-formed JSON is never rewritten.

use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)```json\s*\{\s*"[^"]+"\s*:\s*"\.\.\."\s*[,}].*?```"#)
        .expect("placeholder pattern is valid")
});

static CLOZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{c\d+::(.*?)(?:::[^{}]*?)?\}\}").expect("cloze pattern is valid")
});

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").expect("fence pattern is valid"));

static SINGLE_QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^'\n]*)'\s*:").expect("key pattern is valid"));

static SINGLE_QUOTED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*'([^'"]*?)'(\s*[,}])"#).expect("value pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// ==================== Reply passes ====================

/// Remove fenced example blocks whose first value is the placeholder `"..."`.
pub fn remove_placeholder_blocks(text: &str) -> String {
    PLACEHOLDER_BLOCK.replace_all(text, "").into_owned()
}

/// Replace cloze markup with the hidden text so its braces cannot pass for JSON.
pub fn unwrap_cloze_markup(text: &str) -> String {
    CLOZE.replace_all(text, "${1}").into_owned()
}

/// Remove every code-fence marker, with or without a `json` tag.
pub fn strip_code_fences(text: &str) -> String {
    FENCE.replace_all(text, "").into_owned()
}

/// Reply-level pipeline that keeps fence markers in place.
///
/// Candidates are scanned on this output first; [`strip_code_fences`] is
/// applied on top of it only when that scan finds nothing.
pub fn prepare_reply(text: &str) -> String {
    unwrap_cloze_markup(&remove_placeholder_blocks(text))
}

// ==================== Candidate passes ====================

/// Turn single-quoted keys and simple single-quoted values into JSON strings.
pub fn normalize_quotes(candidate: &str) -> String {
    let keys = SINGLE_QUOTED_KEY.replace_all(candidate, "\"${1}\":");
    SINGLE_QUOTED_VALUE
        .replace_all(&keys, ": \"${1}\"${2}")
        .into_owned()
}

/// Replace literal line breaks (which JSON forbids inside strings) with spaces.
pub fn collapse_newlines(candidate: &str) -> String {
    candidate.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

pub fn collapse_whitespace(candidate: &str) -> String {
    WHITESPACE_RUN.replace_all(candidate, " ").trim().to_string()
}

/// Candidate-level pipeline, in order.
pub fn normalize_candidate(candidate: &str) -> String {
    collapse_whitespace(&collapse_newlines(&normalize_quotes(candidate)))
}
