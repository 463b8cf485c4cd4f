//! Error types for the analyst.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for analyst operations.
#[derive(Error, Debug)]
pub enum AnalystError {
    /// Board API errors (transport failure, timeout, malformed payload, error list).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// The generated snippet could not be read as a plan.
    #[error("Plan error: {0}")]
    Plan(String),

    /// The plan failed while running against the tables.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration errors (invalid config file, missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalystError {
    /// Creates an upstream error with the given message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a plan error with the given message.
    pub fn plan(msg: impl Into<String>) -> Self {
        Self::Plan(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "Upstream Fetch Error",
            Self::Llm(_) | Self::Plan(_) | Self::Execution(_) => "Agent Logic Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for failures raised while generating, reading, or running a plan.
    pub fn is_agent_logic(&self) -> bool {
        matches!(self, Self::Llm(_) | Self::Plan(_) | Self::Execution(_))
    }

    /// Returns the message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Upstream(msg)
            | Self::Llm(msg)
            | Self::Plan(msg)
            | Self::Execution(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using AnalystError.
pub type Result<T> = std::result::Result<T, AnalystError>;
