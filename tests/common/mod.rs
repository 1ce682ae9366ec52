//! Shared test helpers and mock runtime.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use agent_relay::config::RelayConfig;
use agent_relay::error::RelayError;
use agent_relay::runtime::{AgentRuntime, ResponseRequest};
use agent_relay::types::*;

/// One call observed by [`MockRuntime`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { name: String, tool_bindings: Vec<ToolBinding> },
    Delete { name: String, version: String },
    Response(ResponseRequest),
    Stream(ResponseRequest),
}

/// A runtime that records calls and replays queued results.
#[derive(Default)]
pub struct MockRuntime {
    calls: Mutex<Vec<Call>>,
    next_version: AtomicU64,
    create_failures: Mutex<VecDeque<RelayError>>,
    delete_failures: Mutex<VecDeque<RelayError>>,
    responses: Mutex<VecDeque<Result<ResponseEnvelope, RelayError>>>,
    streams: Mutex<VecDeque<Vec<Result<ResponseStreamEvent, RelayError>>>>,
    delay: Mutex<Option<Duration>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_create(&self, err: RelayError) {
        self.create_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_delete(&self, err: RelayError) {
        self.delete_failures.lock().unwrap().push_back(err);
    }

    pub fn queue_response(&self, envelope: ResponseEnvelope) {
        self.responses.lock().unwrap().push_back(Ok(envelope));
    }

    /// Queue a plain text answer.
    pub fn queue_text(&self, text: &str) {
        let queued = self.responses.lock().unwrap().len();
        self.queue_response(ResponseEnvelope {
            response_id: format!("resp_{}", queued + 1),
            output_text: Some(text.to_string()),
            output_items: Vec::new(),
            usage: Some(Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            }),
        });
    }

    pub fn queue_failure(&self, err: RelayError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn queue_stream(&self, events: Vec<Result<ResponseStreamEvent, RelayError>>) {
        self.streams.lock().unwrap().push_back(events);
    }

    /// Hold every response call for `delay` before answering.
    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete { .. }))
            .count()
    }

    /// Response requests, streamed or not, in call order.
    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Response(r) | Call::Stream(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn create_agent_version(
        &self,
        definition: &AgentDefinition,
    ) -> Result<AgentDescriptor, RelayError> {
        self.record(Call::Create {
            name: definition.name.clone(),
            tool_bindings: definition.tool_bindings.clone(),
        });
        if let Some(err) = self.create_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AgentDescriptor {
            name: definition.name.clone(),
            version: version.to_string(),
            model_id: definition.model_id.clone(),
            instructions: definition.instructions.clone(),
            tool_bindings: definition.tool_bindings.clone(),
        })
    }

    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<(), RelayError> {
        self.record(Call::Delete {
            name: name.to_string(),
            version: version.to_string(),
        });
        match self.delete_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn create_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<ResponseEnvelope, RelayError> {
        self.record(Call::Response(request.clone()));
        self.wait().await;
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(ResponseEnvelope {
                response_id: "resp_default".into(),
                output_text: Some("Mock response".into()),
                ..Default::default()
            })
        })
    }

    async fn stream_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<BoxStream<'static, Result<ResponseStreamEvent, RelayError>>, RelayError> {
        self.record(Call::Stream(request.clone()));
        self.wait().await;
        let events = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Environment lookup for a complete, valid configuration plus overrides.
pub fn lookup_with(
    overrides: &[(&'static str, Option<&'static str>)],
) -> impl Fn(&str) -> Option<String> {
    let mut vars: std::collections::HashMap<&'static str, Option<&'static str>> = [
        (
            "FOUNDRY_PROJECT_ENDPOINT",
            Some("https://relay-test.services.ai.azure.com/api/projects/demo"),
        ),
        ("FOUNDRY_API_KEY", Some("test-key")),
        ("SLACK_MCP_SERVER_URL", Some("http://localhost:13080/mcp")),
    ]
    .into_iter()
    .collect();
    for (key, value) in overrides {
        vars.insert(*key, *value);
    }
    move |key: &str| vars.get(key).copied().flatten().map(str::to_string)
}

/// A valid configuration pointing at a local tool server.
pub fn test_config() -> RelayConfig {
    RelayConfig::from_lookup(lookup_with(&[])).unwrap()
}
