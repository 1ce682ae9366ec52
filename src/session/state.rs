//! Explicit per-session state owned by the host loop.

use crate::types::{AgentDescriptor, ChatMessage, Usage};

use super::context::ConversationContext;

/// Chat transcript plus the session id it belongs to.
///
/// The id and the transcript only ever change together: anything that starts
/// a new session also empties the transcript.
#[derive(Debug, Clone)]
pub struct SessionState {
    context: ConversationContext,
    messages: Vec<ChatMessage>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            context: ConversationContext::fresh(),
            messages: Vec::new(),
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn session_id(&self) -> &str {
        self.context.session_id()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Token usage summed over the transcript.
    pub fn total_usage(&self) -> Usage {
        let mut total = Usage::default();
        for usage in self.messages.iter().filter_map(|m| m.usage.as_ref()) {
            total.merge(usage);
        }
        total
    }

    /// Empty the transcript, keeping the session id.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Start a new session for a freshly created agent version.
    pub fn bind_agent(&mut self, descriptor: &AgentDescriptor) {
        self.replace_context(ConversationContext::for_agent(
            &descriptor.name,
            &descriptor.version,
        ));
    }

    /// Discard the id and the transcript together.
    pub fn reset(&mut self) {
        self.replace_context(ConversationContext::fresh());
    }

    fn replace_context(&mut self, mut next: ConversationContext) {
        while next.session_id() == self.context.session_id() {
            next = ConversationContext::fresh();
        }
        self.context = next;
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(version: &str) -> AgentDescriptor {
        AgentDescriptor {
            name: "SlackAssistant".into(),
            version: version.into(),
            model_id: "gpt-4o".into(),
            instructions: String::new(),
            tool_bindings: Vec::new(),
        }
    }

    #[test]
    fn reset_clears_messages_and_changes_id() {
        let mut state = SessionState::new();
        state.bind_agent(&descriptor("1"));
        state.push(ChatMessage::user("hi"));
        state.push(ChatMessage::system("note"));
        let before = state.session_id().to_string();

        state.reset();

        assert!(state.messages().is_empty());
        assert_ne!(state.session_id(), before);
    }

    #[test]
    fn total_usage_sums_assistant_messages() {
        let mut state = SessionState::new();
        state.push(ChatMessage::user("q1"));
        state.push(ChatMessage::assistant(
            "a1",
            0,
            Some(Usage { input_tokens: 10, output_tokens: 5, total_tokens: 15 }),
            "r1",
        ));
        state.push(ChatMessage::assistant(
            "a2",
            1,
            Some(Usage { input_tokens: 7, output_tokens: 3, total_tokens: 10 }),
            "r2",
        ));
        assert_eq!(
            state.total_usage(),
            Usage { input_tokens: 17, output_tokens: 8, total_tokens: 25 }
        );
        state.clear();
        assert_eq!(state.total_usage(), Usage::default());
    }

    #[test]
    fn clear_keeps_session_id() {
        let mut state = SessionState::new();
        state.push(ChatMessage::user("hi"));
        let before = state.session_id().to_string();
        state.clear();
        assert!(state.messages().is_empty());
        assert_eq!(state.session_id(), before);
    }

    #[test]
    fn rebinding_the_same_version_still_yields_a_new_session() {
        let mut state = SessionState::new();
        state.bind_agent(&descriptor("4"));
        let first = state.session_id().to_string();
        state.bind_agent(&descriptor("4"));
        assert_ne!(state.session_id(), first);
    }

    #[test]
    fn binding_an_agent_derives_id_from_identity() {
        let mut state = SessionState::new();
        state.push(ChatMessage::user("stale"));
        state.bind_agent(&descriptor("7"));
        assert_eq!(state.session_id(), "session-SlackAssistant-7");
        assert!(state.messages().is_empty());
    }
}
