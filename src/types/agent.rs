//! Agent definition and descriptor types.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether the hosted runtime may run a tool without a human confirming it.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
pub enum ApprovalPolicy {
    /// Tool calls execute unattended.
    #[default]
    #[serde(rename = "never")]
    #[strum(serialize = "never")]
    NeverAsk,
    /// Every tool call halts pending manual confirmation.
    #[serde(rename = "always")]
    #[strum(serialize = "always")]
    AlwaysAsk,
}

/// Association between an agent and one external tool server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolBinding {
    pub server_label: String,
    pub server_url: String,
    pub approval_policy: ApprovalPolicy,
}

impl ToolBinding {
    pub fn new(
        server_label: impl Into<String>,
        server_url: impl Into<String>,
        approval_policy: ApprovalPolicy,
    ) -> Self {
        Self {
            server_label: server_label.into(),
            server_url: server_url.into(),
            approval_policy,
        }
    }

    /// Wire shape of an MCP tool entry in an agent definition.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "mcp",
            "server_label": self.server_label,
            "server_url": self.server_url,
            "require_approval": self.approval_policy.to_string(),
        })
    }
}

/// What to ask the runtime to create.
#[derive(Debug, Clone, Builder, PartialEq, Eq)]
pub struct AgentDefinition {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub model_id: String,
    #[builder(into)]
    pub instructions: String,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(default)]
    pub tool_bindings: Vec<ToolBinding>,
}

/// A created agent version, as acknowledged by the runtime.
///
/// Immutable after creation; the handle that created it owns the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub name: String,
    pub version: String,
    pub model_id: String,
    pub instructions: String,
    pub tool_bindings: Vec<ToolBinding>,
}

impl AgentDescriptor {
    pub fn approval_policy(&self) -> ApprovalPolicy {
        self.tool_bindings
            .first()
            .map(|b| b.approval_policy)
            .unwrap_or_default()
    }
}

/// Reference to a hosted agent by name, as sent with each response request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentReference {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl AgentReference {
    pub const KIND: &'static str = "agent_reference";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Self::KIND.to_string(),
        }
    }
}
