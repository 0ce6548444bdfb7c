//! Dispatcher configuration.
//!
//! Everything here is resolved at construction time; the dispatchers never
//! consult the environment while handling events.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine variable the serialized message-reference list is stored under.
pub const DEFAULT_MESSAGE_REFS_VARIABLE: &str = "taskbridgeMessageRefs";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for the task and process dispatchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Name of the task-scoped variable holding posted message references.
    pub message_refs_variable: String,
    /// Upper bound on a single outbound chat call made by a dispatcher.
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            message_refs_variable: DEFAULT_MESSAGE_REFS_VARIABLE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    /// Override the message-reference variable name.
    pub fn with_message_refs_variable(mut self, name: impl Into<String>) -> Self {
        self.message_refs_variable = name.into();
        self
    }

    /// Override the outbound call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.message_refs_variable, "taskbridgeMessageRefs");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = DispatcherConfig::default()
            .with_message_refs_variable("bridgeRefs")
            .with_request_timeout(Duration::from_secs(3));
        assert_eq!(config.message_refs_variable, "bridgeRefs");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }
}
