//! Crate-wide error type shared by the engine, chat, and dispatch layers.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Chat API call `{method}` failed: {detail}")]
    ChatApi { method: String, detail: String },

    #[error("Chat API transport failure: {0}")]
    ChatTransport(#[from] reqwest::Error),

    #[error("Chat API call `{method}` timed out after {timeout:?}")]
    ChatTimeout { method: String, timeout: Duration },

    #[error("Invalid chat API base URL `{0}`")]
    InvalidBaseUrl(String),

    #[error("Engine call failed: {0}")]
    Engine(String),

    #[error("No form found for task {0}")]
    MissingTaskForm(String),

    #[error("No start form found for process definition {0}")]
    MissingStartForm(String),

    #[error("No handler matches {kind} id `{id}`")]
    UnroutedInteraction { kind: &'static str, id: String },

    #[error("Interaction payload is missing {0}")]
    MissingPayloadPart(&'static str),

    #[error("Interaction payload part {part} is invalid: `{value}`")]
    InvalidPayloadPart { part: &'static str, value: String },

    #[error("Renderer `{renderer}` cannot represent task {task_id}")]
    RendererMismatch {
        renderer: &'static str,
        task_id: String,
    },

    #[error("Invalid configuration for field `{field}`: {detail}")]
    FieldConfig { field: String, detail: String },

    #[error("Invalid show-variables directive: {0}")]
    ShowVariables(String),

    #[error("Identity resolution failed for `{user}`: {detail}")]
    Identity { user: String, detail: String },

    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an engine-side failure.
    pub fn engine(detail: impl Into<String>) -> Self {
        Error::Engine(detail.into())
    }

    /// Build a chat API failure carrying the platform's error detail.
    pub fn chat_api(method: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::ChatApi {
            method: method.into(),
            detail: detail.into(),
        }
    }

    /// Build a field configuration error for a named field.
    pub fn field_config(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::FieldConfig {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Build an identity resolution failure for a user id.
    pub fn identity(user: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Identity {
            user: user.into(),
            detail: detail.into(),
        }
    }

    /// Build an unrouted-interaction error for an id nothing matched.
    pub fn unrouted(kind: &'static str, id: impl Into<String>) -> Self {
        Error::UnroutedInteraction {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_api_message() {
        let err = Error::chat_api("chat.postMessage", "channel_not_found");
        assert_eq!(
            err.to_string(),
            "Chat API call `chat.postMessage` failed: channel_not_found"
        );
    }

    #[test]
    fn test_unrouted_message() {
        let err = Error::unrouted("action", "bogus/123");
        assert_eq!(err.to_string(), "No handler matches action id `bogus/123`");
    }
}
