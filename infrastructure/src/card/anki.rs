//! Card content extraction from Anki fields and rendered card sides.
//!
//! Cloze cards are graded against the blank under review: `{{cN::answer}}`
//! with `N = ordinal + 1`. Basic cards are graded against the rendered
//! answer side, preferring the text after `<hr id=answer>` so the repeated
//! front side does not leak into the accepted answer.

use checker_domain::CardContent;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

static CLOZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{c(\d+)::(.*?)\}\}").expect("cloze pattern is valid"));

const SKIPPED_TAGS: [&str; 2] = ["style", "script"];
/// Sibling elements after the answer rule that never hold the answer.
const SKIPPED_AFTER_RULE: [&str; 3] = ["style", "script", "div"];
const FSRS_STATUS_ID: &str = "FSRS_status";
const ANSWER_RULE_ID: &str = "answer";

/// A card as the host hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnkiCard {
    /// Raw cloze field text and the 0-based ordinal under review
    Cloze { field: String, ordinal: u32 },
    /// Rendered question and answer sides
    Basic { question: String, answer: String },
}

/// Turns host card data into [`CardContent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnkiCardExtractor;

impl AnkiCardExtractor {
    pub fn extract(&self, card: &AnkiCard) -> CardContent {
        match card {
            AnkiCard::Cloze { field, ordinal } => {
                CardContent::new(html_text(field), cloze_answers(field, *ordinal))
                    .with_ordinal(*ordinal)
            }
            AnkiCard::Basic { question, answer } => {
                CardContent::new(html_text(question), answer_from_rendered(answer))
            }
        }
    }
}

/// Accepted answers of blank `ordinal` (0-based) in a cloze field.
///
/// Only the first matching blank counts; a `::hint` suffix is dropped and
/// markup inside the answer is reduced to its text.
pub fn cloze_answers(field: &str, ordinal: u32) -> Vec<String> {
    let Some(wanted) = ordinal.checked_add(1) else {
        debug!("Cloze ordinal {} has no blank number", ordinal);
        return Vec::new();
    };
    let found = CLOZE.captures_iter(field).find_map(|caps| {
        let number: u32 = caps[1].parse().ok()?;
        (number == wanted).then(|| caps.get(2).map_or("", |m| m.as_str()))
    });

    let Some(inner) = found else {
        debug!("No c{} blank in cloze field", wanted);
        return Vec::new();
    };

    let answer = inner.split_once("::").map_or(inner, |(answer, _hint)| answer);
    let answer = html_text(answer);
    if answer.is_empty() {
        Vec::new()
    } else {
        vec![answer]
    }
}

/// Visible text of an HTML fragment, pieces joined by single spaces.
pub fn html_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collect_element_text(fragment.root_element()).join(" ")
}

/// Accepted answers from a rendered answer side.
///
/// With an `<hr id=answer>` rule, only the siblings after it count; each
/// element contributes its text with no separator, as Anki renders it.
/// Without one, the whole side is used.
pub fn answer_from_rendered(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();

    let text = match find_answer_rule(root) {
        Some(rule) => {
            let mut parts = Vec::new();
            for sibling in rule.next_siblings() {
                match sibling.value() {
                    Node::Text(text) => {
                        let t = text.trim();
                        if !t.is_empty() {
                            parts.push(t.to_string());
                        }
                    }
                    Node::Element(element) => {
                        if SKIPPED_AFTER_RULE.contains(&element.name()) {
                            continue;
                        }
                        if let Some(child) = ElementRef::wrap(sibling) {
                            let t = collect_element_text(child).concat();
                            if !t.is_empty() {
                                parts.push(t);
                            }
                        }
                    }
                    _ => {}
                }
            }
            parts.join(" ")
        }
        None => collect_element_text(root).join(" "),
    };

    if text.is_empty() {
        Vec::new()
    } else {
        vec![text]
    }
}

fn find_answer_rule(root: ElementRef) -> Option<ElementRef> {
    root.descendants().filter_map(ElementRef::wrap).find(|element| {
        let value = element.value();
        value.name() == "hr" && value.id() == Some(ANSWER_RULE_ID)
    })
}

fn is_skipped(element: ElementRef) -> bool {
    let value = element.value();
    SKIPPED_TAGS.contains(&value.name())
        || (value.name() == "span" && value.id() == Some(FSRS_STATUS_ID))
}

/// Recursively collect trimmed text pieces, skipping style, script and the FSRS status span
fn collect_element_text(element: ElementRef) -> Vec<String> {
    if is_skipped(element) {
        return Vec::new();
    }

    let mut parts = Vec::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_el));
                }
            }
            _ => {}
        }
    }

    parts
}
