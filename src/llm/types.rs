//! Chat messages and sampling options for one completion request.

use serde::{Deserialize, Serialize};

/// Author of a prompt message. Requests never replay model output, so there
/// is no assistant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standing instructions, such as the plan format.
    System,
    /// The question and table listing.
    User,
}

impl Role {
    /// Wire name used by chat-completions endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A single message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Sampling options for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    /// Sampling temperature; `None` leaves the provider default.
    pub temperature: Option<f32>,
}

impl CompletionOptions {
    /// The most deterministic sampling the endpoint offers.
    pub fn deterministic() -> Self {
        Self {
            temperature: Some(0.0),
        }
    }
}
