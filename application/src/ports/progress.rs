//! Progress notification port
//!
//! Defines the interface for reporting progress while a request is in
//! flight.

use checker_domain::RequestKind;

/// Callback for progress updates during a gateway call
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, streamed text, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called when the request is sent
    fn on_request_start(&self, kind: RequestKind, model: &str);

    /// Called for each streamed text chunk
    fn on_chunk(&self, _chunk: &str) {}

    /// Called when the request finished, successfully or not
    fn on_request_end(&self, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_request_start(&self, _kind: RequestKind, _model: &str) {}
    fn on_request_end(&self, _success: bool) {}
}
