//! agent-relay: chat with a hosted agent bound to a remote tool server.
//!
//! Creates a named, versioned agent on an Azure AI Foundry project, attaches it
//! to one MCP tool server, relays user questions to it with session-scoped trace
//! metadata, classifies the structured output items that come back, and deletes
//! the agent version when the session ends.
//!
//! # Quick Start
//!
//! ```no_run
//! use agent_relay::prelude::*;
//!
//! # async fn example() -> agent_relay::error::Result<()> {
//! let config = RelayConfig::from_env()?;
//! let mut manager = AgentSessionManager::from_config(config);
//! manager.initialize().await?;
//! let reply = manager.ask("What channels are available?").await?;
//! if let Some(message) = reply.message {
//!     println!("{}", message.content);
//! }
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod session;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
