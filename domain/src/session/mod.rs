//! Streamed reply handling.
//!
//! - [`stream::StreamEvent`]: one event of a streaming reply
//! - [`accumulator::StreamingAccumulator`]: per-request buffers, completion and timeout

pub mod accumulator;
pub mod stream;
