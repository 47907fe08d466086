//! Per-request accumulation of streamed replies.
//!
//! Each request id moves through:
//!
//! ```text
//! Empty ──first chunk──▶ Accumulating ──verdict found──▶ Complete
//!                              │
//!                              └──wait > timeout──▶ TimedOut
//! ```
//!
//! `Complete` and `TimedOut` are terminal for that request: they are
//! reported once through [`ChunkOutcome`] (or [`StreamingAccumulator::expire`])
//! and the buffer is dropped, freeing the id. A later chunk under the same id
//! starts a fresh request. Time is always passed in by the caller, so the
//! state machine itself never reads a clock.

use crate::extraction::{Extraction, ExtractionMode, extract};
use crate::review::request::RequestKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default wait bound, measured from the first chunk of a request.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Caller-chosen identifier of one streamed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What a stream is expected to end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Answer evaluation: complete once a full record is present.
    Evaluation,
    /// Lighter streams: complete once a recommendation is present.
    Recommendation,
    /// Follow-up prose: never completes by extraction, only by [`StreamingAccumulator::finish`].
    FreeText,
}

impl StreamMode {
    pub fn for_kind(kind: RequestKind) -> Self {
        if kind.expects_structured_reply() {
            StreamMode::Evaluation
        } else {
            StreamMode::FreeText
        }
    }

    pub fn extraction_mode(&self) -> Option<ExtractionMode> {
        match self {
            StreamMode::Evaluation => Some(ExtractionMode::FullRecord),
            StreamMode::Recommendation => Some(ExtractionMode::Recommendation),
            StreamMode::FreeText => None,
        }
    }
}

/// Whether an id currently holds a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Never started, or already retired.
    Empty,
    Accumulating,
}

/// Result of feeding one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Still waiting for a verdict.
    Accumulating,
    /// A verdict was found; the id is freed.
    Complete { extraction: Extraction, text: String },
    /// The wait bound was exceeded; distinct from "no verdict found".
    TimedOut { text: String },
}

#[derive(Debug)]
struct StreamBuffer {
    text: String,
    first_chunk_at: Instant,
    mode: StreamMode,
}

impl StreamBuffer {
    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.first_chunk_at) > timeout
    }
}

/// Buffers for every in-flight streamed request, keyed by request id.
#[derive(Debug)]
pub struct StreamingAccumulator {
    timeout: Duration,
    buffers: HashMap<RequestId, StreamBuffer>,
}

impl Default for StreamingAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_TIMEOUT)
    }
}

impl StreamingAccumulator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            buffers: HashMap::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Append `chunk` to the buffer of `id` and check it for a verdict.
    ///
    /// The first chunk of an id starts its clock and fixes its mode. The
    /// timeout is checked after appending and before extraction, so a reply
    /// that completes too late still counts as timed out.
    pub fn push_chunk(
        &mut self,
        id: &RequestId,
        chunk: &str,
        mode: StreamMode,
        now: Instant,
    ) -> ChunkOutcome {
        let buffer = self.buffers.entry(id.clone()).or_insert_with(|| {
            trace!("First chunk for request {}", id);
            StreamBuffer {
                text: String::new(),
                first_chunk_at: now,
                mode,
            }
        });
        buffer.text.push_str(chunk);

        if buffer.is_expired(now, self.timeout) {
            debug!("Request {} timed out after {:?}", id, self.timeout);
            let text = self.retire(id);
            return ChunkOutcome::TimedOut { text };
        }

        let Some(extraction) = buffer
            .mode
            .extraction_mode()
            .and_then(|mode| extract(&buffer.text, mode))
        else {
            return ChunkOutcome::Accumulating;
        };

        debug!(
            "Request {} complete with recommendation {}",
            id,
            extraction.recommendation()
        );
        let text = self.retire(id);
        ChunkOutcome::Complete { extraction, text }
    }

    /// Time out every buffer whose wait exceeded the bound at `now`, even if
    /// no further chunk arrived. Returns the affected ids in order.
    pub fn expire(&mut self, now: Instant) -> Vec<RequestId> {
        let mut expired: Vec<RequestId> = self
            .buffers
            .iter()
            .filter(|(_, buffer)| buffer.is_expired(now, self.timeout))
            .map(|(id, _)| id.clone())
            .collect();
        expired.sort();

        for id in &expired {
            debug!("Request {} timed out waiting for chunks", id);
            self.retire(id);
        }
        expired
    }

    /// Time out `id` alone if its wait exceeded the bound at `now`.
    ///
    /// Returns the text it had buffered. Other requests are left untouched,
    /// so several streams can share one accumulator.
    pub fn expire_request(&mut self, id: &RequestId, now: Instant) -> Option<String> {
        if !self.buffers.get(id)?.is_expired(now, self.timeout) {
            return None;
        }
        debug!("Request {} timed out waiting for chunks", id);
        Some(self.retire(id))
    }

    /// End-of-stream for `id`: drain its buffer and free the id.
    ///
    /// This is how free-text streams finish. Returns `None` if the id has
    /// no buffer (never started, or already retired).
    pub fn finish(&mut self, id: &RequestId) -> Option<String> {
        if !self.buffers.contains_key(id) {
            return None;
        }
        Some(self.retire(id))
    }

    pub fn state(&self, id: &RequestId) -> StreamState {
        if self.buffers.contains_key(id) {
            StreamState::Accumulating
        } else {
            StreamState::Empty
        }
    }

    /// Number of requests currently accumulating.
    pub fn in_flight(&self) -> usize {
        self.buffers.len()
    }

    /// Text buffered so far for an accumulating request.
    pub fn buffered(&self, id: &RequestId) -> Option<&str> {
        self.buffers.get(id).map(|b| b.text.as_str())
    }

    fn retire(&mut self, id: &RequestId) -> String {
        self.buffers
            .remove(id)
            .map(|buffer| buffer.text)
            .unwrap_or_default()
    }
}
