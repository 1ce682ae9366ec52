//! Structured responses returned by the hosted runtime.
//!
//! Output items are decoded once, here, into a closed [`OutputItem`] union.
//! Anything the relay does not act on lands in [`OutputItem::Other`] with its
//! wire tag preserved.

use serde::Deserialize;

use super::usage::Usage;

/// One element of a response's ordered output list.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    /// The runtime enumerated the tools a server exposes.
    ToolDiscovery {
        server_label: String,
        tool_count: usize,
        tool_names: Vec<String>,
    },
    /// The runtime executed a tool on a server.
    ToolCall {
        id: String,
        tool_name: String,
        server_label: String,
        arguments: serde_json::Value,
        error: Option<String>,
    },
    /// The runtime paused waiting for a human to confirm a tool call.
    ApprovalRequest {
        tool_call_id: String,
        server_label: String,
        tool_name: String,
        arguments: serde_json::Value,
    },
    Other { kind: String },
}

impl OutputItem {
    /// The wire tag this item was decoded from.
    pub fn kind(&self) -> &str {
        match self {
            Self::ToolDiscovery { .. } => "mcp_list_tools",
            Self::ToolCall { .. } => "mcp_call",
            Self::ApprovalRequest { .. } => "mcp_approval_request",
            Self::Other { kind } => kind,
        }
    }
}

/// The result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "WireResponse")]
pub struct ResponseEnvelope {
    pub response_id: String,
    pub output_text: Option<String>,
    pub output_items: Vec<OutputItem>,
    pub usage: Option<Usage>,
}

impl ResponseEnvelope {
    /// The final text, if the runtime produced any non-empty text.
    /// Whitespace-only text still counts.
    pub fn text(&self) -> Option<&str> {
        self.output_text.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Option<Vec<WireOutputItem>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct WireOutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    server_label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    tools: Option<Vec<WireTool>>,
    #[serde(default)]
    content: Option<Vec<WireContentPart>>,
}

#[derive(Debug, Deserialize)]
struct WireTool {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl From<WireResponse> for ResponseEnvelope {
    fn from(wire: WireResponse) -> Self {
        let items = wire.output.unwrap_or_default();

        let output_text = wire.output_text.or_else(|| {
            let text: String = items
                .iter()
                .filter(|item| item.kind == "message")
                .flat_map(|item| item.content.iter().flatten())
                .filter(|part| part.kind == "output_text")
                .filter_map(|part| part.text.as_deref())
                .collect();
            (!text.is_empty()).then_some(text)
        });

        Self {
            response_id: wire.id.unwrap_or_default(),
            output_text,
            output_items: items.into_iter().map(OutputItem::from).collect(),
            usage: wire.usage.map(Usage::normalized),
        }
    }
}

impl From<WireOutputItem> for OutputItem {
    fn from(item: WireOutputItem) -> Self {
        match item.kind.as_str() {
            "mcp_list_tools" => {
                let tool_names: Vec<String> = item
                    .tools
                    .unwrap_or_default()
                    .into_iter()
                    .map(|t| t.name)
                    .collect();
                Self::ToolDiscovery {
                    server_label: item.server_label.unwrap_or_default(),
                    tool_count: tool_names.len(),
                    tool_names,
                }
            }
            "mcp_call" => Self::ToolCall {
                id: item.id.unwrap_or_default(),
                tool_name: item.name.unwrap_or_default(),
                server_label: item.server_label.unwrap_or_default(),
                arguments: decode_arguments(item.arguments),
                error: item.error.and_then(|e| match e {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                }),
            },
            "mcp_approval_request" => Self::ApprovalRequest {
                tool_call_id: item.id.unwrap_or_default(),
                server_label: item.server_label.unwrap_or_default(),
                tool_name: item.name.unwrap_or_default(),
                arguments: decode_arguments(item.arguments),
            },
            _ => Self::Other { kind: item.kind },
        }
    }
}

/// Tool arguments arrive JSON-encoded inside a string; keep the raw string when it does not parse.
fn decode_arguments(raw: Option<serde_json::Value>) -> serde_json::Value {
    match raw {
        Some(serde_json::Value::String(s)) => {
            serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s))
        }
        Some(other) => other,
        None => serde_json::Value::Null,
    }
}
