//! Error types for agent-relay.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::config::ConfigField;

/// Primary error type for all relay operations.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing required configuration: {}", format_fields(.fields))]
    MissingConfig { fields: Vec<ConfigField> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Agent initialization failed: {0}")]
    AgentInit(#[source] Box<RelayError>),

    #[error("Query dispatch failed: {0}")]
    Dispatch(#[source] Box<RelayError>),

    #[error("Agent cleanup failed: {0}")]
    Cleanup(#[source] Box<RelayError>),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

fn format_fields(fields: &[ConfigField]) -> String {
    fields
        .iter()
        .map(|f| format!("{} ({})", f.name(), f.env_var()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RelayError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn agent_init(cause: RelayError) -> Self {
        Self::AgentInit(Box::new(cause))
    }

    pub fn dispatch(cause: RelayError) -> Self {
        Self::Dispatch(Box::new(cause))
    }

    pub fn cleanup(cause: RelayError) -> Self {
        Self::Cleanup(Box::new(cause))
    }

    /// The underlying cause, looking through the lifecycle wrappers.
    pub fn root(&self) -> &RelayError {
        match self {
            Self::AgentInit(inner) | Self::Dispatch(inner) | Self::Cleanup(inner) => inner.root(),
            other => other,
        }
    }

    /// Logical names of the missing fields, if this is a missing-config error.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self.root() {
            Self::MissingConfig { fields } => fields.iter().map(|f| f.name()).collect(),
            _ => Vec::new(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Self::MissingConfig { .. } | Self::Configuration(_) | Self::ConfigFile(_) => {
                ErrorCategory::Configuration
            }
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) | Self::Stream(_) => ErrorCategory::Serialization,
            Self::InvalidState(_) => ErrorCategory::State,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether the same call may succeed if the user simply tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::RetryLater
            }
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::State => RecoverySuggestion::Reinitialize,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RelayError>;
