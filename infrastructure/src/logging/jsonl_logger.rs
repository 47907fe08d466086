//! JSONL file writer for review events.
//!
//! Each [`ReviewEvent`] becomes one JSON line carrying its `type`, a
//! `timestamp` and the payload fields. The file is opened in append mode so
//! one log can span many sessions.

use checker_application::{ReviewEvent, ReviewLogger};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL review logger that writes one JSON object per line.
pub struct JsonlReviewLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlReviewLogger {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` if the file cannot be opened; reviews then run unlogged.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create review log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open review log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: ReviewEvent, timestamp: String) -> Value {
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        }
        other => serde_json::json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": other,
        }),
    }
}

impl ReviewLogger for JsonlReviewLogger {
    fn log(&self, event: ReviewEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&to_record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlReviewLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.jsonl");
        let logger = JsonlReviewLogger::open(&path).unwrap();

        logger.log(ReviewEvent::new(
            "prompt",
            serde_json::json!({"kind": "answer", "model": "llm", "user": "Capital?"}),
        ));
        logger.log(ReviewEvent::new(
            "verdict",
            serde_json::json!({"recommendation": "Good"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "prompt");
        assert_eq!(records[0]["kind"], "answer");
        assert_eq!(records[1]["type"], "verdict");
        assert_eq!(records[1]["recommendation"], "Good");
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
    }

    #[test]
    fn test_appends_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reviews.jsonl");

        for reply in ["first", "second"] {
            let logger = JsonlReviewLogger::open(&path).unwrap();
            logger.log(ReviewEvent::new("reply", serde_json::json!({"text": reply})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["text"], "second");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.jsonl");
        let logger = JsonlReviewLogger::open(&path).unwrap();

        logger.log(ReviewEvent::new("timeout", serde_json::json!("partial reply")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "timeout");
        assert_eq!(records[0]["data"], "partial reply");
    }

    #[test]
    fn test_unopenable_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file.
        assert!(JsonlReviewLogger::open(dir.path()).is_none());
    }
}
