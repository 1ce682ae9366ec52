//! Plain-text rendering of responses and status for the terminal.

use std::fmt::Write as _;

use crate::classify::{ClassifiedResponse, Notice};
use crate::config::RelayConfig;
use crate::session::SessionState;
use crate::types::{AgentDescriptor, ChatMessage};
use crate::util::text::ellipsize;

/// Questions suggested by `/samples`.
pub const SAMPLE_QUERIES: [&str; 4] = [
    "What tools do you have?",
    "List all public channels",
    "Show recent messages from #tech",
    "What can you do?",
];

/// Questions run in order by `relay demo`.
pub const DEMO_QUESTIONS: [&str; 5] = [
    "What channels are available in this Slack workspace?",
    "Show me recent messages from the #tech channel",
    "Who are the users in this workspace?",
    "Find messages mentioning 'deployment' or 'production' in #tech",
    "What was discussed in the recent conversation threads?",
];

const TOOL_NAMES_SHOWN: usize = 10;
const ARGUMENTS_SHOWN: usize = 200;

pub fn help() -> String {
    [
        "Commands:",
        "  /clear    clear the chat history (same session)",
        "  /reset    release the agent and start a new session",
        "  /status   show agent and session details",
        "  /samples  list sample questions",
        "  /help     show this help",
        "  quit, exit, q   end the session",
    ]
    .join("\n")
}

pub fn samples() -> String {
    let mut out = String::from("Try asking:");
    for q in SAMPLE_QUERIES {
        let _ = write!(out, "\n  - \"{q}\"");
    }
    out
}

/// Banner text for one notice.
pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::ToolsDiscovered { tool_names, .. } => {
            let mut out = format!("[tools] {}", notice.summary());
            if !tool_names.is_empty() {
                let shown: Vec<&str> = tool_names
                    .iter()
                    .take(TOOL_NAMES_SHOWN)
                    .map(String::as_str)
                    .collect();
                let _ = write!(out, "\n        {}", shown.join(", "));
                if tool_names.len() > TOOL_NAMES_SHOWN {
                    let _ = write!(out, " (+{} more)", tool_names.len() - TOOL_NAMES_SHOWN);
                }
            }
            out
        }
        Notice::ApprovalRequired {
            tool_call_id,
            server_label,
            tool_name,
            arguments,
            ..
        } => {
            let args = ellipsize(&arguments.to_string(), ARGUMENTS_SHOWN);
            format!(
                "[approval] {}\n        id: {tool_call_id}\n        server: {server_label}\n        tool: {tool_name}\n        arguments: {args}",
                notice.summary()
            )
        }
    }
}

/// Trace line shown under an assistant message.
pub fn trace(message: &ChatMessage) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(id) = &message.response_id {
        parts.push(format!("Response ID: {id}"));
    }
    if let Some(usage) = &message.usage {
        parts.push(format!("Tokens: {usage}"));
    }
    if message.tool_call_count > 0 {
        parts.push(format!("Tool calls: {}", message.tool_call_count));
    }
    (!parts.is_empty()).then(|| format!("  ({})", parts.join(" | ")))
}

/// Full rendering of a classified response. With `text_shown`, the answer
/// text itself was already printed while streaming.
pub fn response(classified: &ClassifiedResponse, text_shown: bool) -> String {
    let mut lines = Vec::new();
    for n in &classified.notices {
        lines.push(notice(n));
    }
    for call in &classified.tool_calls {
        lines.push(format!("[tool call] {call}"));
    }
    match &classified.message {
        Some(message) => {
            if !text_shown {
                lines.push(format!("Assistant: {}", message.content));
            }
            if let Some(trace) = trace(message) {
                lines.push(trace);
            }
        }
        None if classified.pending_approval => {
            lines.push("(waiting for tool approval; no answer yet)".to_string());
        }
        None => lines.push("(no text in response)".to_string()),
    }
    lines.join("\n")
}

/// Status report. Needs no network access.
pub fn status(
    config: &RelayConfig,
    descriptor: Option<&AgentDescriptor>,
    session: &SessionState,
) -> String {
    let mut out = String::new();
    match descriptor {
        Some(d) => {
            let _ = writeln!(out, "Agent:        {} (version {})", d.name, d.version);
        }
        None => {
            let _ = writeln!(out, "Agent:        {} (not created)", config.agent_name);
        }
    }
    let _ = writeln!(out, "Model:        {}", config.model);
    let _ = writeln!(out, "Approval:     {}", config.approval_policy);
    let _ = writeln!(out, "Streaming:    {}", if config.streaming { "on" } else { "off" });
    let _ = writeln!(out, "Session:      {}", session.context().short_id());
    let _ = writeln!(out, "Messages:     {}", session.messages().len());
    let _ = writeln!(out, "Tokens used:  {}", session.total_usage());
    let _ = writeln!(
        out,
        "Tool server:  {} [{}] ({})",
        config.tool_server_url,
        config.tool_server_label,
        config.tool_server_location()
    );
    let _ = writeln!(out, "Workspace:    {}", config.workspace);
    let _ = write!(
        out,
        "Tool token:   {}",
        if config.tool_token.is_some() { "set" } else { "not set" }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Usage;
    use serde_json::json;

    fn config() -> RelayConfig {
        RelayConfig::from_lookup(|key| match key {
            "FOUNDRY_PROJECT_ENDPOINT" => Some("https://example.services.ai.azure.com/api/projects/p".into()),
            "FOUNDRY_API_KEY" => Some("k".into()),
            "SLACK_MCP_SERVER_URL" => Some("https://abc.ngrok-free.app/mcp".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn trace_shows_id_and_usage() {
        let message = ChatMessage::assistant(
            "hi",
            1,
            Some(Usage { input_tokens: 12, output_tokens: 30, total_tokens: 42 }),
            "resp_1",
        );
        let line = trace(&message).unwrap();
        assert!(line.contains("Response ID: resp_1"));
        assert!(line.contains("Tokens: 42 total (12 input, 30 output)"));
        assert!(line.contains("Tool calls: 1"));
        assert!(trace(&ChatMessage::assistant("hi", 0, None, "")).is_none());
    }

    #[test]
    fn status_without_agent_reports_tunnel_and_missing_token() {
        let config = config();
        let mut session = SessionState::new();
        session.bind_agent(&AgentDescriptor {
            name: "SlackAssistant".into(),
            version: "3".into(),
            model_id: "gpt-4o".into(),
            instructions: String::new(),
            tool_bindings: Vec::new(),
        });
        let report = status(&config, None, &session);
        assert!(report.contains("SlackAssistant (not created)"));
        assert!(report.contains("(tunnel)"));
        assert!(report.contains("Session:      SlackAss"));
        assert!(report.contains("Tool token:   not set"));
        assert!(report.contains("Approval:     never"));
        assert!(report.contains("Tokens used:  0 total (0 input, 0 output)"));
    }

    #[test]
    fn approval_notice_lists_call_details() {
        let n = Notice::ApprovalRequired {
            tool_call_id: "apr_7".into(),
            server_label: "slack".into(),
            tool_name: "post_message".into(),
            arguments: json!({"channel": "#tech"}),
            unexpected: false,
        };
        let text = notice(&n);
        assert!(text.contains("id: apr_7"));
        assert!(text.contains("tool: post_message"));
        assert!(text.contains("#tech"));
    }

    #[test]
    fn streamed_response_omits_text() {
        let classified = ClassifiedResponse {
            tool_calls: vec!["list_channels (server: slack)".into()],
            message: Some(ChatMessage::assistant("the answer", 1, None, "resp_2")),
            ..Default::default()
        };
        let streamed = response(&classified, true);
        assert!(!streamed.contains("the answer"));
        assert!(streamed.contains("[tool call] list_channels (server: slack)"));
        assert!(response(&classified, false).contains("Assistant: the answer"));
    }
}
