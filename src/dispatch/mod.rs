//! Query dispatch: one user utterance in, one structured response out.
//!
//! The dispatcher never touches session state. Network failures surface as a
//! single [`RelayError::Dispatch`]; there is no automatic retry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures::StreamExt;
use tracing::debug;

use crate::error::{RelayError, Result};
use crate::runtime::{AgentRuntime, ResponseRequest, TraceMetadata};
use crate::session::ConversationContext;
use crate::types::{AgentDescriptor, AgentReference, ResponseEnvelope, ResponseStreamEvent};
use crate::util::text::truncate_chars;
use crate::util::timeout::with_timeout;

/// How much of the query is copied into trace metadata.
pub const TRACE_QUERY_CHARS: usize = 100;

/// One dispatch, as issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub text: String,
    pub session_id: String,
    pub issued_at: DateTime<Utc>,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>, context: &ConversationContext) -> Self {
        Self {
            text: text.into(),
            session_id: context.session_id().to_string(),
            issued_at: Utc::now(),
        }
    }

    /// Wire request for an agent. The model gets the full text; the trace
    /// metadata gets a prefix of it.
    pub fn to_response_request(&self, agent_name: &str) -> ResponseRequest {
        ResponseRequest {
            input: self.text.clone(),
            agent: AgentReference::new(agent_name),
            metadata: TraceMetadata {
                session_id: self.session_id.clone(),
                timestamp: self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                user_query: truncate_chars(&self.text, TRACE_QUERY_CHARS).to_string(),
            },
        }
    }
}

/// Sends queries to the runtime with a bounded wait.
pub struct QueryDispatcher {
    runtime: Arc<dyn AgentRuntime>,
    timeout: Duration,
}

impl QueryDispatcher {
    pub fn new(runtime: Arc<dyn AgentRuntime>, timeout: Duration) -> Self {
        Self { runtime, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a query and wait for the full response.
    pub async fn send(
        &self,
        text: &str,
        agent: &AgentDescriptor,
        context: &ConversationContext,
    ) -> Result<ResponseEnvelope> {
        let request = QueryRequest::new(text, context).to_response_request(&agent.name);
        debug!(
            agent = %agent.name,
            session_id = %request.metadata.session_id,
            "Dispatching query"
        );

        let envelope = with_timeout(self.timeout, self.runtime.create_response(&request))
            .await
            .map_err(RelayError::dispatch)?;

        debug!(
            response_id = %envelope.response_id,
            items = envelope.output_items.len(),
            "Query answered"
        );
        Ok(envelope)
    }

    /// Send a query, handing text deltas to `on_delta` as they arrive.
    ///
    /// The timeout covers the whole stream. The completion marker's envelope is
    /// returned; if the stream ends without one, the accumulated text is.
    pub async fn send_streaming<F>(
        &self,
        text: &str,
        agent: &AgentDescriptor,
        context: &ConversationContext,
        mut on_delta: F,
    ) -> Result<ResponseEnvelope>
    where
        F: FnMut(&str),
    {
        let request = QueryRequest::new(text, context).to_response_request(&agent.name);
        debug!(
            agent = %agent.name,
            session_id = %request.metadata.session_id,
            "Dispatching streamed query"
        );

        let consume = async {
            let mut stream = self.runtime.stream_response(&request).await?;
            let mut accumulated = String::new();

            while let Some(event) = stream.next().await {
                match event? {
                    ResponseStreamEvent::TextDelta(delta) => {
                        on_delta(&delta);
                        accumulated.push_str(&delta);
                    }
                    ResponseStreamEvent::Completed(mut envelope) => {
                        if envelope.output_text.is_none() && !accumulated.is_empty() {
                            envelope.output_text = Some(accumulated);
                        }
                        return Ok(envelope);
                    }
                }
            }

            Ok::<_, RelayError>(ResponseEnvelope {
                output_text: (!accumulated.is_empty()).then_some(accumulated),
                ..Default::default()
            })
        };

        with_timeout(self.timeout, consume)
            .await
            .map_err(RelayError::dispatch)
    }
}
