//! [`CardSource`] adapters.

use super::anki::{AnkiCard, AnkiCardExtractor};
use checker_application::{CardError, CardSource};
use checker_domain::{CardContent, CardId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves one fixed card.
#[derive(Debug, Clone)]
pub struct StaticCardSource {
    id: Option<CardId>,
    content: CardContent,
}

impl StaticCardSource {
    pub fn new(content: CardContent) -> Self {
        Self { id: None, content }
    }

    pub fn from_anki(card: &AnkiCard) -> Self {
        Self::new(AnkiCardExtractor.extract(card))
    }

    pub fn with_id(mut self, id: CardId) -> Self {
        self.id = Some(id);
        self
    }
}

impl CardSource for StaticCardSource {
    fn card_id(&self) -> Option<CardId> {
        self.id
    }

    fn card_content(&self) -> Result<CardContent, CardError> {
        Ok(self.content.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CardFile {
    id: Option<i64>,
    #[serde(flatten)]
    card: AnkiCard,
}

/// Reads the card under review from a JSON file on every request.
///
/// The host rewrites the file when the reviewer moves on, so a long-running
/// session always sees the current card.
///
/// ```json
/// {"id": 1712, "type": "cloze", "field": "{{c1::Paris}} is ...", "ordinal": 0}
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileCardSource {
    path: PathBuf,
}

impl JsonFileCardSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CardFile, CardError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(CardError::NoCard),
            Err(e) => {
                return Err(CardError::Unreadable(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| CardError::Unreadable(format!("{}: {}", self.path.display(), e)))
    }
}

impl CardSource for JsonFileCardSource {
    fn card_id(&self) -> Option<CardId> {
        self.read().ok().and_then(|file| file.id).map(CardId)
    }

    fn card_content(&self) -> Result<CardContent, CardError> {
        let file = self.read()?;
        debug!("Read card {:?} from {}", file.id, self.path.display());
        Ok(AnkiCardExtractor.extract(&file.card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_domain::ErrorKind;

    #[test]
    fn test_static_source() {
        let source = StaticCardSource::from_anki(&AnkiCard::Cloze {
            field: "{{c1::Paris}} is the capital".to_string(),
            ordinal: 0,
        })
        .with_id(CardId(7));

        assert_eq!(source.card_id(), Some(CardId(7)));
        let content = source.card_content().unwrap();
        assert_eq!(content.accepted_answers, vec!["Paris"]);
    }

    #[test]
    fn test_json_file_source_follows_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        let source = JsonFileCardSource::new(&path);

        std::fs::write(
            &path,
            r#"{"id": 1, "type": "basic", "question": "Capital of France?", "answer": "Capital of France?<hr id=answer>Paris"}"#,
        )
        .unwrap();
        assert_eq!(source.card_id(), Some(CardId(1)));
        assert_eq!(source.card_content().unwrap().accepted_answers, vec!["Paris"]);

        std::fs::write(
            &path,
            r#"{"id": 2, "type": "cloze", "field": "{{c1::Berlin}} is in Germany", "ordinal": 0}"#,
        )
        .unwrap();
        assert_eq!(source.card_id(), Some(CardId(2)));
        assert_eq!(source.card_content().unwrap().accepted_answers, vec!["Berlin"]);
    }

    #[test]
    fn test_missing_file_is_no_card() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileCardSource::new(dir.path().join("none.json"));
        assert!(source.card_id().is_none());
        assert!(matches!(source.card_content(), Err(CardError::NoCard)));
    }

    #[test]
    fn test_malformed_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileCardSource::new(&path).card_content().unwrap_err();
        assert!(matches!(err, CardError::Unreadable(_)));
        assert_eq!(err.kind(), ErrorKind::CardUnavailable);
    }
}
