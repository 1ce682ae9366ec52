//! Streaming types.

use super::response::ResponseEnvelope;

/// An event emitted while a streamed response is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseStreamEvent {
    /// Incremental text content.
    TextDelta(String),
    /// Completion marker carrying the full response.
    Completed(ResponseEnvelope),
}
