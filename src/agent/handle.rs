//! Lifecycle of one remote agent version.
//!
//! `Uninitialized -> Ready -> Terminated`, with re-initialization allowed from
//! `Terminated`. The handle is the only thing that creates or deletes the
//! remote agent version it owns.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::runtime::AgentRuntime;
use crate::types::{AgentDefinition, AgentDescriptor, ToolBinding};

/// Where the handle is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Ready(AgentDescriptor),
    Terminated,
}

/// Owner of a single named, versioned agent bound to one tool server.
pub struct AgentHandle {
    runtime: Arc<dyn AgentRuntime>,
    definition: AgentDefinition,
    state: HandleState,
}

impl AgentHandle {
    pub fn new(runtime: Arc<dyn AgentRuntime>, definition: AgentDefinition) -> Self {
        Self {
            runtime,
            definition,
            state: HandleState::Uninitialized,
        }
    }

    pub fn from_config(runtime: Arc<dyn AgentRuntime>, config: &RelayConfig) -> Self {
        Self::new(runtime, Self::definition_from_config(config))
    }

    /// The agent definition for a config: exactly one tool binding, to the configured server.
    pub fn definition_from_config(config: &RelayConfig) -> AgentDefinition {
        AgentDefinition::builder()
            .name(config.agent_name.clone())
            .model_id(config.model.clone())
            .instructions(config.instructions.clone())
            .description(config.description.clone())
            .tool_bindings(vec![ToolBinding::new(
                config.tool_server_label.clone(),
                config.tool_server_url.clone(),
                config.approval_policy,
            )])
            .build()
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    pub fn state(&self) -> &HandleState {
        &self.state
    }

    pub fn descriptor(&self) -> Option<&AgentDescriptor> {
        match &self.state {
            HandleState::Ready(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, HandleState::Ready(_))
    }

    /// Create a new agent version.
    ///
    /// Fails with [`RelayError::InvalidState`] when a version is already live;
    /// release it with [`AgentHandle::cleanup`] first. On a runtime failure the
    /// state is left untouched so the call can simply be retried.
    pub async fn initialize(&mut self) -> Result<AgentDescriptor> {
        if let HandleState::Ready(live) = &self.state {
            return Err(RelayError::InvalidState(format!(
                "agent {} version {} is still live; clean it up before creating another",
                live.name, live.version
            )));
        }

        let descriptor = self
            .runtime
            .create_agent_version(&self.definition)
            .await
            .map_err(RelayError::agent_init)?;

        info!(
            agent = %descriptor.name,
            version = %descriptor.version,
            model = %descriptor.model_id,
            approval = %descriptor.approval_policy(),
            "Agent version created"
        );
        self.state = HandleState::Ready(descriptor.clone());
        Ok(descriptor)
    }

    /// Delete the live agent version, if any, and move to `Terminated`.
    ///
    /// Never fails: a rejected delete is logged at warn and the handle still
    /// ends up `Terminated`.
    pub async fn cleanup(&mut self) {
        let previous = std::mem::replace(&mut self.state, HandleState::Terminated);
        let HandleState::Ready(descriptor) = previous else {
            return;
        };

        match self
            .runtime
            .delete_agent_version(&descriptor.name, &descriptor.version)
            .await
        {
            Ok(()) => info!(
                agent = %descriptor.name,
                version = %descriptor.version,
                "Agent version deleted"
            ),
            Err(e) => {
                let err = RelayError::cleanup(e);
                warn!(
                    agent = %descriptor.name,
                    version = %descriptor.version,
                    error = %err,
                    "Ignoring agent cleanup failure"
                );
            }
        }
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        if let HandleState::Ready(descriptor) = &self.state {
            warn!(
                agent = %descriptor.name,
                version = %descriptor.version,
                "Agent handle dropped without cleanup; remote agent version is still allocated"
            );
        }
    }
}
