//! Convenience re-exports for common use.

pub use crate::agent::{AgentHandle, AgentSessionManager, HandleState};
pub use crate::classify::{ClassifiedResponse, Notice, NoticeLevel, ResponseClassifier};
pub use crate::config::{Credential, RelayConfig};
pub use crate::error::{RelayError, Result};
pub use crate::runtime::{AgentRuntime, FoundryRuntime};
pub use crate::session::{ConversationContext, SessionState};
pub use crate::types::{
    AgentDescriptor, ApprovalPolicy, ChatMessage, OutputItem, ResponseEnvelope, Role, ToolBinding,
    Usage,
};
