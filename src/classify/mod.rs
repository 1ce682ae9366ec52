//! Response classification.
//!
//! Walks a response's output items in emission order, buckets them by kind, and
//! derives what the chat surface should show. Pure: no network, no hidden state.

use tracing::{debug, warn};

use crate::types::{ApprovalPolicy, ChatMessage, OutputItem, ResponseEnvelope, Usage};

/// Severity of a banner shown alongside the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// An intermediate banner derived from one output item.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    ToolsDiscovered {
        server_label: String,
        tool_count: usize,
        tool_names: Vec<String>,
    },
    ApprovalRequired {
        tool_call_id: String,
        server_label: String,
        tool_name: String,
        arguments: serde_json::Value,
        /// The binding was created with NEVER_ASK, so this request should not exist.
        unexpected: bool,
    },
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Self::ToolsDiscovered { .. } => NoticeLevel::Info,
            Self::ApprovalRequired { .. } => NoticeLevel::Warning,
        }
    }

    /// One-line text for the banner.
    pub fn summary(&self) -> String {
        match self {
            Self::ToolsDiscovered {
                server_label,
                tool_count,
                ..
            } => format!("Tool discovery: found {tool_count} tools on {server_label}"),
            Self::ApprovalRequired {
                tool_name,
                server_label,
                unexpected: false,
                ..
            } => format!("Approval required: {tool_name} on {server_label} is waiting for confirmation"),
            Self::ApprovalRequired {
                tool_name,
                server_label,
                unexpected: true,
                ..
            } => format!(
                "Unexpected approval request: {tool_name} on {server_label} asked for confirmation although tools are auto-approved"
            ),
        }
    }
}

/// Tools enumerated across all discovery items of one response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolDiscoverySummary {
    pub tool_count: usize,
    pub tool_names: Vec<String>,
}

/// Everything the chat surface needs from one response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedResponse {
    pub response_id: String,
    /// Banners in item order.
    pub notices: Vec<Notice>,
    pub discovered_tools: ToolDiscoverySummary,
    /// `"<tool_name> (server: <server_label>)"`, in call order.
    pub tool_calls: Vec<String>,
    pub pending_approval: bool,
    /// Wire tags of items the relay does not act on, in order.
    pub ignored_kinds: Vec<String>,
    /// Final assistant message; absent when the response carried no text.
    pub message: Option<ChatMessage>,
    pub usage: Option<Usage>,
}

impl ClassifiedResponse {
    /// An approval request appeared although the binding auto-approves.
    pub fn has_unexpected_approval(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::ApprovalRequired { unexpected: true, .. }))
    }
}

/// Format a tool call for the call log.
pub fn format_tool_call(tool_name: &str, server_label: &str) -> String {
    format!("{tool_name} (server: {server_label})")
}

/// Classifier for responses produced under a given approval policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseClassifier {
    policy: ApprovalPolicy,
}

impl ResponseClassifier {
    pub fn new(policy: ApprovalPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    pub fn classify(&self, envelope: &ResponseEnvelope) -> ClassifiedResponse {
        let mut out = ClassifiedResponse {
            response_id: envelope.response_id.clone(),
            usage: envelope.usage,
            ..Default::default()
        };

        for item in &envelope.output_items {
            match item {
                OutputItem::ToolDiscovery {
                    server_label,
                    tool_count,
                    tool_names,
                } => {
                    out.discovered_tools.tool_count += tool_count;
                    out.discovered_tools
                        .tool_names
                        .extend(tool_names.iter().cloned());
                    out.notices.push(Notice::ToolsDiscovered {
                        server_label: server_label.clone(),
                        tool_count: *tool_count,
                        tool_names: tool_names.clone(),
                    });
                }
                OutputItem::ToolCall {
                    tool_name,
                    server_label,
                    ..
                } => {
                    out.tool_calls.push(format_tool_call(tool_name, server_label));
                }
                OutputItem::ApprovalRequest {
                    tool_call_id,
                    server_label,
                    tool_name,
                    arguments,
                } => {
                    let unexpected = self.policy == ApprovalPolicy::NeverAsk;
                    if unexpected {
                        warn!(
                            response_id = %envelope.response_id,
                            tool = %tool_name,
                            server = %server_label,
                            "Approval requested although the tool binding never asks"
                        );
                    }
                    out.pending_approval = true;
                    out.notices.push(Notice::ApprovalRequired {
                        tool_call_id: tool_call_id.clone(),
                        server_label: server_label.clone(),
                        tool_name: tool_name.clone(),
                        arguments: arguments.clone(),
                        unexpected,
                    });
                }
                OutputItem::Other { kind } => {
                    debug!(kind = %kind, "Skipping output item");
                    out.ignored_kinds.push(kind.clone());
                }
            }
        }

        out.message = envelope.text().map(|text| {
            ChatMessage::assistant(
                text,
                out.tool_calls.len(),
                envelope.usage,
                envelope.response_id.clone(),
            )
        });
        out
    }
}
