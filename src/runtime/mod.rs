//! Hosted agent runtime contract and its HTTP implementation.

pub mod foundry;
pub mod http;

pub use foundry::FoundryRuntime;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::RelayError;
use crate::types::{AgentDefinition, AgentDescriptor, AgentReference, ResponseEnvelope, ResponseStreamEvent};

/// Trace metadata attached to every response request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TraceMetadata {
    pub session_id: String,
    /// RFC 3339 issue time.
    pub timestamp: String,
    /// Searchable prefix of the query; never the text the model sees.
    pub user_query: String,
}

/// A request for one agent response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseRequest {
    pub input: String,
    pub agent: AgentReference,
    pub metadata: TraceMetadata,
}

/// Operations the relay needs from the hosted runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Create a new version of a named agent.
    async fn create_agent_version(
        &self,
        definition: &AgentDefinition,
    ) -> Result<AgentDescriptor, RelayError>;

    /// Delete one agent version.
    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<(), RelayError>;

    /// Run a prompt against an agent (non-streaming).
    async fn create_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<ResponseEnvelope, RelayError>;

    /// Run a prompt against an agent, yielding text deltas then a completion marker.
    async fn stream_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<BoxStream<'static, Result<ResponseStreamEvent, RelayError>>, RelayError>;
}
