//! Conversation identity and the per-session chat transcript.

pub mod context;
pub mod state;

pub use context::ConversationContext;
pub use state::SessionState;
