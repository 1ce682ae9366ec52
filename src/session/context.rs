//! Session identifiers threaded through every dispatch.

use chrono::{DateTime, Utc};

const SESSION_PREFIX: &str = "session-";

/// Correlation identity for one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    session_id: String,
    created_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Derive the id from agent identity when known, otherwise generate one.
    pub fn new(agent: Option<(&str, &str)>) -> Self {
        match agent {
            Some((name, version)) => Self::for_agent(name, version),
            None => Self::fresh(),
        }
    }

    /// Deterministic id: the same agent version always maps to the same session.
    pub fn for_agent(name: &str, version: &str) -> Self {
        Self {
            session_id: format!("{SESSION_PREFIX}{name}-{version}"),
            created_at: Utc::now(),
        }
    }

    /// Random id for a session with no agent bound yet.
    pub fn fresh() -> Self {
        Self {
            session_id: format!("{SESSION_PREFIX}{}", uuid::Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// First eight characters after the prefix, for status lines.
    pub fn short_id(&self) -> &str {
        let id = self
            .session_id
            .strip_prefix(SESSION_PREFIX)
            .unwrap_or(&self.session_id);
        crate::util::text::truncate_chars(id, 8)
    }
}
