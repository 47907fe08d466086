//! Card content adapters.
//!
//! [`AnkiCardExtractor`] turns cloze fields and rendered card sides into
//! [`CardContent`](checker_domain::CardContent); the sources implement the
//! [`CardSource`](checker_application::CardSource) port on top of it.

mod anki;
mod source;

pub use anki::{AnkiCard, AnkiCardExtractor, answer_from_rendered, cloze_answers, html_text};
pub use source::{JsonFileCardSource, StaticCardSource};
