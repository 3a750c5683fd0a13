//! Error types for eduagent-core.

use thiserror::Error;

/// Result type alias using eduagent-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during agent orchestration.
///
/// Only `Validation`, `AgentNotFound` and `RateLimitExceeded` ever reach
/// callers of [`crate::AgentManager::route_request`]. Provider-level failures
/// are absorbed by the fallback chain.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// No agent registered for the requested type
    #[error("Agent not found: {agent_type}")]
    AgentNotFound { agent_type: String },

    /// Admission check failed for an agent type
    #[error("Rate limit exceeded for agent '{agent_type}'")]
    RateLimitExceeded { agent_type: String },

    /// Provider call failed
    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    /// Primary and fallback providers both failed (or no fallback configured)
    #[error("All providers failed for agent '{agent_type}': {message}")]
    FallbackExhausted { agent_type: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an agent-not-found error.
    pub fn agent_not_found(agent_type: impl ToString) -> Self {
        Self::AgentNotFound {
            agent_type: agent_type.to_string(),
        }
    }

    /// Create a rate-limit error.
    pub fn rate_limit_exceeded(agent_type: impl ToString) -> Self {
        Self::RateLimitExceeded {
            agent_type: agent_type.to_string(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl ToString, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Create a fallback-exhausted error.
    pub fn fallback_exhausted(agent_type: impl ToString, message: impl Into<String>) -> Self {
        Self::FallbackExhausted {
            agent_type: agent_type.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error is surfaced to `route_request` callers.
    pub fn is_caller_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::AgentNotFound { .. } | Self::RateLimitExceeded { .. }
        )
    }
}
