//! Core types for agent-relay.

pub mod agent;
pub mod message;
pub mod response;
pub mod stream;
pub mod usage;

pub use agent::*;
pub use message::*;
pub use response::*;
pub use stream::*;
pub use usage::*;
