//! Azure AI Foundry agent service over REST.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::{Credential, RelayConfig};
use crate::error::RelayError;
use crate::types::{AgentDefinition, AgentDescriptor, ResponseEnvelope, ResponseStreamEvent};

use super::http::{error_from_response, json_headers, shared_client, SseDecoder};
use super::{AgentRuntime, ResponseRequest};

/// HTTP client for a Foundry project endpoint.
pub struct FoundryRuntime {
    endpoint: String,
    api_version: String,
    credential: Credential,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AgentVersionResponse {
    name: String,
    version: serde_json::Value,
}

impl FoundryRuntime {
    pub fn new(
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            credential,
            client: shared_client().clone(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.api_version.clone(),
            config.credential.clone(),
        )
    }

    /// Use a dedicated client instead of the shared one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}?api-version={}", self.endpoint, self.api_version)
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, RelayError> {
        let mut headers = json_headers();
        self.credential.apply(&mut headers)?;
        Ok(headers)
    }

    fn build_definition_body(definition: &AgentDefinition) -> serde_json::Value {
        let tools: Vec<serde_json::Value> =
            definition.tool_bindings.iter().map(|b| b.to_wire()).collect();
        let mut body = serde_json::json!({
            "definition": {
                "kind": "prompt",
                "model": definition.model_id,
                "instructions": definition.instructions,
                "tools": tools,
            },
        });
        if let (Some(description), Some(obj)) = (&definition.description, body.as_object_mut()) {
            obj.insert("description".into(), description.clone().into());
        }
        body
    }

    fn build_response_body(request: &ResponseRequest, stream: bool) -> Result<serde_json::Value, RelayError> {
        let mut body = serde_json::to_value(request)?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert("stream".into(), stream.into());
        }
        Ok(body)
    }

    async fn post_response(
        &self,
        request: &ResponseRequest,
        stream: bool,
    ) -> Result<reqwest::Response, RelayError> {
        let body = Self::build_response_body(request, stream)?;
        let resp = self
            .client
            .post(self.url("openai/responses"))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp)
    }
}

/// Decode one SSE payload. `Ok(None)` means the event carries nothing for the caller.
fn parse_stream_event(data: &str) -> Result<Option<ResponseStreamEvent>, RelayError> {
    let event: serde_json::Value = serde_json::from_str(data)?;
    let event_type = event.get("type").and_then(|t| t.as_str()).unwrap_or("");
    match event_type {
        "response.output_text.delta" => Ok(event
            .get("delta")
            .and_then(|d| d.as_str())
            .filter(|d| !d.is_empty())
            .map(|d| ResponseStreamEvent::TextDelta(d.to_string()))),
        "response.completed" => {
            let response = event
                .get("response")
                .cloned()
                .ok_or_else(|| RelayError::Stream("completion event without response".into()))?;
            Ok(Some(ResponseStreamEvent::Completed(serde_json::from_value(response)?)))
        }
        "response.failed" | "response.incomplete" | "error" => {
            let message = event
                .pointer("/response/error/message")
                .or_else(|| event.pointer("/error/message"))
                .or_else(|| event.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or(event_type);
            Err(RelayError::Stream(message.to_string()))
        }
        _ => Ok(None),
    }
}

#[async_trait]
impl AgentRuntime for FoundryRuntime {
    async fn create_agent_version(
        &self,
        definition: &AgentDefinition,
    ) -> Result<AgentDescriptor, RelayError> {
        let body = Self::build_definition_body(definition);
        debug!(agent = %definition.name, model = %definition.model_id, "Creating agent version");

        let resp = self
            .client
            .post(self.url(&format!("agents/{}/versions", definition.name)))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let created: AgentVersionResponse = resp.json().await?;
        let version = match created.version {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => {
                return Err(RelayError::api(200, "agent version missing from create response"))
            }
            other => other.to_string(),
        };

        Ok(AgentDescriptor {
            name: created.name,
            version,
            model_id: definition.model_id.clone(),
            instructions: definition.instructions.clone(),
            tool_bindings: definition.tool_bindings.clone(),
        })
    }

    async fn delete_agent_version(&self, name: &str, version: &str) -> Result<(), RelayError> {
        debug!(agent = name, version, "Deleting agent version");
        let resp = self
            .client
            .delete(self.url(&format!("agents/{name}/versions/{version}")))
            .headers(self.headers()?)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_from_response(resp).await)
    }

    async fn create_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<ResponseEnvelope, RelayError> {
        let resp = self.post_response(request, false).await?;
        Ok(resp.json().await?)
    }

    async fn stream_response(
        &self,
        request: &ResponseRequest,
    ) -> Result<BoxStream<'static, Result<ResponseStreamEvent, RelayError>>, RelayError> {
        let resp = self.post_response(request, true).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut terminated = false;
            futures::pin_mut!(byte_stream);

            'outer: while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(RelayError::Network(e));
                        terminated = true;
                        break;
                    }
                };
                for data in decoder.push(&chunk) {
                    if data == "[DONE]" {
                        terminated = true;
                        break 'outer;
                    }
                    match parse_stream_event(&data) {
                        Ok(Some(event)) => {
                            let done = matches!(event, ResponseStreamEvent::Completed(_));
                            yield Ok(event);
                            if done {
                                terminated = true;
                                break 'outer;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            terminated = true;
                            break 'outer;
                        }
                    }
                }
            }

            // Only a body that ended without a terminal event can hold one more.
            if !terminated {
                if let Some(data) = decoder.finish() {
                    if data != "[DONE]" {
                        match parse_stream_event(&data) {
                            Ok(Some(event)) => yield Ok(event),
                            Ok(None) => {}
                            Err(e) => yield Err(e),
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
