//! HTTP implementation of the chat client against a Slack-compatible Web API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::view::ModalView;
use super::{ChatClient, MessagePayload, PostedMessage};
use crate::error::{Error, Result};
use crate::model::MessageRef;

/// Web API client posting JSON method calls with bearer authentication.
#[derive(Debug)]
pub struct HttpChatClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpChatClient {
    /// Build a client for the API at `base_url`, authenticating with `token`.
    ///
    /// `timeout` caps each HTTP round trip at the transport level; the
    /// dispatchers add their own per-call bound on top.
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    async fn call(&self, method: &'static str, payload: Value) -> Result<ApiEnvelope> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            method
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::chat_api(method, format!("HTTP status {status}")));
        }

        let envelope: ApiEnvelope = response.json().await?;
        if let Some(warning) = &envelope.warning {
            tracing::warn!(method = %method, warning = %warning, "Chat API warning");
        }
        if !envelope.ok {
            let detail = envelope
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(Error::chat_api(method, detail));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn post_message(
        &self,
        destination: &str,
        payload: &MessagePayload,
    ) -> Result<PostedMessage> {
        let body = serde_json::json!({
            "channel": destination,
            "text": payload.text,
            "blocks": payload.blocks,
        });
        let envelope = self.call("chat.postMessage", body).await?;
        let channel = envelope
            .channel
            .ok_or_else(|| Error::chat_api("chat.postMessage", "Response carried no channel"))?;
        let ts = envelope
            .ts
            .ok_or_else(|| Error::chat_api("chat.postMessage", "Response carried no ts"))?;
        Ok(PostedMessage { channel, ts })
    }

    async fn update_message(&self, message: &MessageRef, payload: &MessagePayload) -> Result<()> {
        let body = serde_json::json!({
            "channel": message.channel,
            "ts": message.ts,
            "text": payload.text,
            "blocks": payload.blocks,
        });
        self.call("chat.update", body).await.map(|_| ())
    }

    async fn open_modal(&self, trigger_id: &str, view: &ModalView) -> Result<()> {
        let body = serde_json::json!({
            "trigger_id": trigger_id,
            "view": view,
        });
        self.call("views.open", body).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warning: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpChatClient::new("not a url", "xoxb-1", Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid chat API base URL `not a url`");
    }

    #[test]
    fn test_envelope_parses_failure_response() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error.as_deref(), Some("channel_not_found"));
        assert_eq!(envelope.ts, None);
    }

    #[test]
    fn test_envelope_parses_post_response() {
        let envelope: ApiEnvelope = serde_json::from_str(
            r#"{"ok":true,"channel":"C123","ts":"1616512345.000100","warning":"superfluous_charset"}"#,
        )
        .unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.channel.as_deref(), Some("C123"));
        assert_eq!(envelope.ts.as_deref(), Some("1616512345.000100"));
        assert_eq!(envelope.warning.as_deref(), Some("superfluous_charset"));
    }
}
