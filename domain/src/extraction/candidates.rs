//! Locating JSON-shaped candidates inside free text.
//!
//! All functions return byte ranges into the scanned text, in document
//! order. Nothing here parses JSON; that is the extractor's job.

use std::ops::Range;

const FENCE: &str = "```";

/// Find the `}` closing the `{` at byte offset `open`, skipping braces
/// inside double-quoted strings.
fn match_object(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[open..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Outermost balanced `{...}` spans, in document order.
///
/// An opening brace that never closes (stray prose brace, or an object still
/// being streamed) is skipped and the scan resumes right after it, so a
/// well-formed object further on is still found.
pub fn balanced_objects(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find('{') {
        let open = pos + found;
        match match_object(text, open) {
            Some(close) => {
                spans.push(open..close + 1);
                pos = close + 1;
            }
            None => pos = open + 1,
        }
    }

    spans
}

/// Balanced spans strictly inside `span` (its outer braces excluded).
pub fn nested_objects(text: &str, span: &Range<usize>) -> Vec<Range<usize>> {
    let inner = span.start + 1..span.end.saturating_sub(1);
    if inner.is_empty() {
        return Vec::new();
    }
    balanced_objects(&text[inner.clone()])
        .into_iter()
        .map(|r| r.start + inner.start..r.end + inner.start)
        .collect()
}

/// The object that closes the text, ignoring trailing whitespace and a
/// trailing fence marker.
pub fn trailing_object(text: &str) -> Option<Range<usize>> {
    let mut end = text.trim_end().len();
    if text[..end].ends_with(FENCE) {
        end = text[..end - FENCE.len()].trim_end().len();
    }
    if !text[..end].ends_with('}') {
        return None;
    }

    let head = &text[..end];
    head.match_indices('{')
        .map(|(i, _)| i)
        .rev()
        .find(|&open| match_object(head, open) == Some(end - 1))
        .map(|open| open..end)
}
