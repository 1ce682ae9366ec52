//! Agent Session Manager: one agent handle, one session, one chat transcript.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::{ClassifiedResponse, ResponseClassifier};
use crate::config::RelayConfig;
use crate::dispatch::QueryDispatcher;
use crate::error::{RelayError, Result};
use crate::runtime::{AgentRuntime, FoundryRuntime};
use crate::session::SessionState;
use crate::types::{AgentDescriptor, ApprovalPolicy, ChatMessage, ResponseEnvelope};

use super::handle::{AgentHandle, HandleState};

/// Drives the initialize / ask / reset / shutdown cycle for a chat surface.
///
/// Every method that talks to the remote agent takes `&mut self`, so a session
/// never has two dispatches in flight.
pub struct AgentSessionManager {
    config: RelayConfig,
    handle: AgentHandle,
    dispatcher: QueryDispatcher,
    classifier: ResponseClassifier,
    state: SessionState,
    streaming: bool,
}

impl AgentSessionManager {
    pub fn new(config: RelayConfig, runtime: Arc<dyn AgentRuntime>) -> Self {
        let handle = AgentHandle::from_config(Arc::clone(&runtime), &config);
        let dispatcher = QueryDispatcher::new(runtime, config.request_timeout);
        let classifier = ResponseClassifier::new(config.approval_policy);
        let streaming = config.streaming;
        Self {
            config,
            handle,
            dispatcher,
            classifier,
            state: SessionState::new(),
            streaming,
        }
    }

    /// Manager backed by the Foundry REST runtime.
    pub fn from_config(config: RelayConfig) -> Self {
        let runtime: Arc<dyn AgentRuntime> = Arc::new(FoundryRuntime::from_config(&config));
        Self::new(config, runtime)
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.state.messages()
    }

    pub fn session_id(&self) -> &str {
        self.state.session_id()
    }

    pub fn handle_state(&self) -> &HandleState {
        self.handle.state()
    }

    pub fn descriptor(&self) -> Option<&AgentDescriptor> {
        self.handle.descriptor()
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        self.classifier.policy()
    }

    pub fn streaming(&self) -> bool {
        self.streaming
    }

    pub fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
    }

    /// Create the agent version and start a session bound to it.
    pub async fn initialize(&mut self) -> Result<AgentDescriptor> {
        let descriptor = self.handle.initialize().await?;
        self.state.bind_agent(&descriptor);
        info!(session_id = %self.state.session_id(), "Session started");
        Ok(descriptor)
    }

    /// Send one utterance, honoring the streaming setting, discarding deltas.
    pub async fn ask(&mut self, text: &str) -> Result<ClassifiedResponse> {
        self.ask_with(text, |_| {}).await
    }

    /// Send one utterance. When streaming is on, `on_delta` sees text as it arrives.
    ///
    /// The user message is appended first. A failed dispatch appends a system
    /// message and returns the error; the agent and session stay usable.
    pub async fn ask_with<F>(&mut self, text: &str, on_delta: F) -> Result<ClassifiedResponse>
    where
        F: FnMut(&str),
    {
        let Some(descriptor) = self.handle.descriptor().cloned() else {
            return Err(RelayError::InvalidState(
                "agent is not initialized; call initialize first".into(),
            ));
        };

        self.state.push(ChatMessage::user(text));
        let context = self.state.context().clone();

        let result: Result<ResponseEnvelope> = if self.streaming {
            self.dispatcher
                .send_streaming(text, &descriptor, &context, on_delta)
                .await
        } else {
            self.dispatcher.send(text, &descriptor, &context).await
        };

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(session_id = %context.session_id(), error = %e, "Query failed");
                self.state.push(ChatMessage::system(format!("Error: {e}")));
                return Err(e);
            }
        };

        let classified = self.classifier.classify(&envelope);
        if let Some(message) = &classified.message {
            self.state.push(message.clone());
        }
        debug!(
            response_id = %classified.response_id,
            tool_calls = classified.tool_calls.len(),
            pending_approval = classified.pending_approval,
            "Response classified"
        );
        Ok(classified)
    }

    /// Empty the transcript, keeping the agent and the session id.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Release the agent version and start a fresh, unbound session.
    pub async fn reset(&mut self) {
        self.handle.cleanup().await;
        self.state.reset();
        info!(session_id = %self.state.session_id(), "Session reset");
    }

    /// Reset, then create a new agent version for the new session.
    pub async fn reinitialize(&mut self) -> Result<AgentDescriptor> {
        self.reset().await;
        self.initialize().await
    }

    /// Release the agent version. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.handle.cleanup().await;
    }
}
