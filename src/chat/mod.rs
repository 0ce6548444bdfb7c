//! Chat platform boundary: outbound client trait, message payloads, and the
//! inbound interaction payloads the webhook layer hands over.

pub mod blocks;
pub mod http;
pub mod view;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use self::blocks::Block;
use self::view::{ModalView, ViewState};
use crate::error::{Error, Result};
use crate::model::MessageRef;

/// One outbound message: notification fallback text plus layout blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePayload {
    /// Shown where blocks cannot render, e.g. push notifications.
    pub text: String,
    pub blocks: Vec<Block>,
}

impl MessagePayload {
    pub fn new(text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            text: text.into(),
            blocks,
        }
    }
}

/// Where a posted message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// Outbound chat operations the dispatchers need.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn post_message(
        &self,
        destination: &str,
        payload: &MessagePayload,
    ) -> Result<PostedMessage>;

    /// Replace a previously posted message wholesale.
    async fn update_message(&self, message: &MessageRef, payload: &MessagePayload) -> Result<()>;

    /// Open a modal against a short-lived interaction trigger.
    async fn open_modal(&self, trigger_id: &str, view: &ModalView) -> Result<()>;
}

pub type SharedChatClient = Arc<dyn ChatClient>;

/// A button click delivered by the platform's interaction webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInvocation {
    pub action_id: String,
    pub block_id: String,
    pub value: Option<String>,
    /// Chat-side id of the person who clicked.
    pub user_id: String,
    /// Present only while the platform still accepts a modal open for this click.
    pub trigger_id: Option<String>,
}

/// A modal submission delivered by the platform's interaction webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSubmission {
    pub callback_id: String,
    pub user_id: String,
    pub state: ViewState,
}

/// What to answer an inbound interaction with.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionReply {
    /// Empty 200; a submitted modal closes, a clicked message stays as-is.
    Ack,
    /// Keep the modal open and mark the offending inputs.
    Errors(IndexMap<String, String>),
    /// Replace the open modal with a new view.
    UpdateModal(ModalView),
}

impl InteractionReply {
    /// Body to answer the interaction webhook with; `None` means empty 200.
    pub fn response_body(&self) -> Result<Option<Value>> {
        match self {
            InteractionReply::Ack => Ok(None),
            InteractionReply::Errors(errors) => Ok(Some(serde_json::json!({
                "response_action": "errors",
                "errors": errors,
            }))),
            InteractionReply::UpdateModal(view) => Ok(Some(serde_json::json!({
                "response_action": "update",
                "view": serde_json::to_value(view)?,
            }))),
        }
    }
}

/// Bound an outbound chat call; a hang becomes a typed timeout error.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    method: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::ChatTimeout {
            method: method.to_string(),
            timeout: limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_has_no_body() {
        assert_eq!(InteractionReply::Ack.response_body().unwrap(), None);
    }

    #[test]
    fn test_errors_reply_body() {
        let mut errors = IndexMap::new();
        errors.insert("rating_long".to_string(), "Invalid number".to_string());
        let body = InteractionReply::Errors(errors).response_body().unwrap();
        assert_eq!(
            body,
            Some(serde_json::json!({
                "response_action": "errors",
                "errors": {"rating_long": "Invalid number"}
            }))
        );
    }

    #[test]
    fn test_update_reply_carries_the_view() {
        let view = ModalView::modal("modal-task-submit/t2", "Next task", vec![]);
        let body = InteractionReply::UpdateModal(view)
            .response_body()
            .unwrap()
            .unwrap();
        assert_eq!(body["response_action"], "update");
        assert_eq!(body["view"]["callback_id"], "modal-task-submit/t2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_turns_hangs_into_errors() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(10),
            "chat.postMessage",
            std::future::pending(),
        )
        .await;
        match result {
            Err(Error::ChatTimeout { method, timeout }) => {
                assert_eq!(method, "chat.postMessage");
                assert_eq!(timeout, Duration::from_secs(10));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
    }
}
