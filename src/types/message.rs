//! Chat messages shown to the user.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::usage::Usage;

/// Message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message in the chat transcript. Appended, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub tool_call_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_count: 0,
            usage: None,
            response_id: None,
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a system message (errors, notices).
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Create an assistant message with its trace details.
    pub fn assistant(
        text: impl Into<String>,
        tool_call_count: usize,
        usage: Option<Usage>,
        response_id: impl Into<String>,
    ) -> Self {
        let response_id = response_id.into();
        Self {
            tool_call_count,
            usage,
            response_id: (!response_id.is_empty()).then_some(response_id),
            ..Self::new(Role::Assistant, text)
        }
    }
}
