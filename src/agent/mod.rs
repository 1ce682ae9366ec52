//! Remote agent lifecycle and the session manager built on it.

pub mod handle;
pub mod manager;

pub use handle::{AgentHandle, HandleState};
pub use manager::AgentSessionManager;
