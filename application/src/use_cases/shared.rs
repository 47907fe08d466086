//! Shared utilities for use cases.
//!
//! Drives a gateway stream through the shared [`StreamingAccumulator`],
//! sweeping it periodically so a stream that goes silent still times out.

use crate::ports::llm_gateway::{GatewayError, StreamHandle};
use crate::ports::progress::ProgressNotifier;
use checker_domain::{
    ChunkOutcome, Extraction, RequestId, StreamEvent, StreamMode, StreamState,
    StreamingAccumulator,
};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// How often in-flight buffers are checked against the wait bound.
pub(crate) const SWEEP_INTERVAL: Duration = Duration::from_millis(250);

/// How a driven stream ended.
#[derive(Debug)]
pub(crate) enum StreamEnd {
    /// The accumulator found the verdict the stream mode waits for.
    Complete { extraction: Extraction, text: String },
    /// The transport ended the stream; `text` is everything received.
    Finished(String),
    /// The wait bound was exceeded; `text` is whatever had arrived.
    TimedOut(String),
}

/// Feed every event of `handle` into the accumulator under `id`.
///
/// The wait for the first chunk is bounded by the same timeout the
/// accumulator applies from the first chunk on. The sweep only ever times
/// out `id`, so streams sharing the accumulator never retire each other.
pub(crate) async fn drive_stream(
    mut handle: StreamHandle,
    accumulator: &Mutex<StreamingAccumulator>,
    id: &RequestId,
    mode: StreamMode,
    progress: &dyn ProgressNotifier,
) -> Result<StreamEnd, GatewayError> {
    let started = Instant::now();
    let timeout = accumulator.lock().await.timeout();
    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seen_delta = false;

    loop {
        tokio::select! {
            biased;
            event = handle.next_event() => match event {
                Some(StreamEvent::Delta(chunk)) => {
                    seen_delta = true;
                    progress.on_chunk(&chunk);
                    if let Some(end) = push(accumulator, id, &chunk, mode).await {
                        return Ok(end);
                    }
                }
                Some(StreamEvent::Completed(text)) => {
                    // Non-streaming adapters deliver the whole reply here.
                    if !seen_delta && !text.is_empty() {
                        progress.on_chunk(&text);
                        if let Some(end) = push(accumulator, id, &text, mode).await {
                            return Ok(end);
                        }
                    }
                    return Ok(finish(accumulator, id).await);
                }
                Some(StreamEvent::Error(e)) => {
                    accumulator.lock().await.finish(id);
                    return Err(GatewayError::RequestFailed(e));
                }
                None => {
                    debug!("Stream {} closed without a Completed event", id);
                    return Ok(finish(accumulator, id).await);
                }
            },
            _ = sweep.tick() => {
                let mut acc = accumulator.lock().await;
                match acc.state(id) {
                    StreamState::Empty if started.elapsed() > timeout => {
                        debug!("No chunk for {} within {:?}", id, timeout);
                        return Ok(StreamEnd::TimedOut(String::new()));
                    }
                    StreamState::Accumulating => {
                        if let Some(partial) = acc.expire_request(id, Instant::now().into_std()) {
                            return Ok(StreamEnd::TimedOut(partial));
                        }
                    }
                    StreamState::Empty => {}
                }
            }
        }
    }
}

async fn push(
    accumulator: &Mutex<StreamingAccumulator>,
    id: &RequestId,
    chunk: &str,
    mode: StreamMode,
) -> Option<StreamEnd> {
    let outcome = accumulator
        .lock()
        .await
        .push_chunk(id, chunk, mode, Instant::now().into_std());

    match outcome {
        ChunkOutcome::Accumulating => None,
        ChunkOutcome::Complete { extraction, text } => {
            Some(StreamEnd::Complete { extraction, text })
        }
        ChunkOutcome::TimedOut { text } => Some(StreamEnd::TimedOut(text)),
    }
}

async fn finish(accumulator: &Mutex<StreamingAccumulator>, id: &RequestId) -> StreamEnd {
    StreamEnd::Finished(accumulator.lock().await.finish(id).unwrap_or_default())
}
