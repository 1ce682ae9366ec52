//! CLI entry point for agent-relay.

pub mod render;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;

use crate::config::RelayConfig;
use crate::types::ApprovalPolicy;

/// Words that end an interactive session.
pub const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// Chat with a hosted agent bound to a Slack MCP server.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "Chat with an Azure AI Foundry agent over MCP")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalArgs,

    /// Defaults to `chat`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the answer as it is generated
    #[arg(long, global = true)]
    pub stream: bool,

    /// Tool approval mode (never, always)
    #[arg(long, global = true, value_name = "MODE")]
    pub approval: Option<ApprovalPolicy>,

    /// Per-query timeout in seconds
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl GlobalArgs {
    /// Layer command-line overrides on top of the resolved configuration.
    pub fn apply(&self, config: &mut RelayConfig) {
        if self.stream {
            config.streaming = true;
        }
        if let Some(policy) = self.approval {
            config.approval_policy = policy;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat session
    Chat,
    /// Ask a single question and exit
    Ask(AskArgs),
    /// Run the demo questions in order
    Demo,
    /// Show configuration and session status without contacting the service
    Status,
}

/// Arguments for `relay ask`.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct AskArgs {
    /// The question (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.question.join(" ")
    }
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Chat)
    }
}

/// One line of input in the interactive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Quit,
    Clear,
    Reset,
    Status,
    Samples,
    Help,
    Unknown(String),
    Ask(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if QUIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
            return Self::Quit;
        }
        match line {
            "/clear" => Self::Clear,
            "/reset" => Self::Reset,
            "/status" => Self::Status,
            "/samples" => Self::Samples,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other if other.starts_with('/') => Self::Unknown(other.to_string()),
            other => Self::Ask(other.to_string()),
        }
    }
}

/// Latched Ctrl-C.
///
/// The listener is installed once and stays armed for the whole process, so a
/// signal that arrives while a query is in flight is never lost. Once set, every
/// later [`Interrupt::guard`] returns immediately.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    /// Start listening for Ctrl-C. Must be called inside a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });
        Self { rx }
    }

    /// An interrupt driven by any `watch` sender; `true` means interrupted.
    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once Ctrl-C has been pressed, including before this call.
    /// Never resolves if the listener could not be installed.
    pub async fn wait(&mut self) {
        let closed = self.rx.wait_for(|hit| *hit).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` to completion unless Ctrl-C arrives first; `None` when interrupted.
    pub async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.wait() => None,
            out = fut => Some(out),
        }
    }
}

/// How a non-interactive run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    Interrupted,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Failed => 1,
            Self::Interrupted => 130,
        }
    }
}
