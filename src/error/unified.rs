//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Serialization,
    State,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Supply the missing or malformed settings and retry.
    CheckConfiguration,
    CheckCredentials,
    /// Retry the same request later; nothing client-side is wrong.
    RetryLater,
    IncreaseTimeout,
    /// Re-initialize the agent before issuing further queries.
    Reinitialize,
    ContactSupport,
}
