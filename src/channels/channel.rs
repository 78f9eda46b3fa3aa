//! Channel trait and the message types that cross it.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// Stream of messages produced by a started channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// How the user produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Typed free text.
    #[default]
    Text,
    /// A tap on one of the offered choices.
    Selection,
}

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Name of the channel it arrived on.
    pub channel: String,
    /// Stable per-user key used for sessions and stored profiles.
    pub user_id: String,
    /// Display name, when the transport provides one.
    pub user_name: Option<String>,
    pub content: String,
    pub kind: InputKind,
    pub received_at: DateTime<Utc>,
    /// Channel-specific routing data (e.g. the Telegram `chat_id`).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            user_id: user_id.into(),
            user_name: None,
            content: content.into(),
            kind: InputKind::Text,
            received_at: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the message as a tapped choice rather than typed text.
    pub fn as_selection(mut self) -> Self {
        self.kind = InputKind::Selection;
        self
    }
}

/// A reply to send back on the originating channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingResponse {
    pub content: String,
    /// Options to offer as a keyboard. Empty means none.
    pub choices: Vec<String>,
    /// Remove any keyboard left over from an earlier prompt.
    pub remove_choices: bool,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn removing_choices(mut self) -> Self {
        self.remove_choices = true;
        self
    }
}

/// Transient progress signals. Channels that cannot show them ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Work is in progress (Telegram shows "typing...").
    Thinking(String),
}

/// A bidirectional message transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name, used to route replies.
    fn name(&self) -> &str;

    /// Begin receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a reply to the sender of `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Show a progress signal. Default: ignore.
    async fn send_status(
        &self,
        _status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Check that the transport is reachable.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Release resources before exit.
    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_defaults_to_text() {
        let msg = IncomingMessage::new("cli", "local-user", "hello");
        assert_eq!(msg.kind, InputKind::Text);
        assert!(msg.user_name.is_none());
        assert!(msg.metadata.is_null());
    }

    #[test]
    fn incoming_builders() {
        let msg = IncomingMessage::new("telegram", "42", "Male")
            .with_user_name("Ann")
            .with_metadata(serde_json::json!({"chat_id": "7"}))
            .as_selection();
        assert_eq!(msg.kind, InputKind::Selection);
        assert_eq!(msg.user_name.as_deref(), Some("Ann"));
        assert_eq!(msg.metadata["chat_id"], "7");
    }

    #[test]
    fn outgoing_builders() {
        let plain = OutgoingResponse::text("hi");
        assert!(plain.choices.is_empty());
        assert!(!plain.remove_choices);

        let keyed = OutgoingResponse::text("pick").with_choices(["Yes", "No"]);
        assert_eq!(keyed.choices, vec!["Yes", "No"]);

        let cleared = OutgoingResponse::text("done").removing_choices();
        assert!(cleared.remove_choices);
    }
}
