//! Channel manager: starts every channel, merges their streams, routes replies.

use std::sync::Arc;

use futures::stream;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

/// Owns the registered channels.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Arc<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. Replies go to the first channel with a matching name.
    pub fn add(&mut self, channel: Arc<dyn Channel>) {
        tracing::debug!(channel = channel.name(), "Registered channel");
        self.channels.push(channel);
    }

    fn get(&self, name: &str) -> Result<&Arc<dyn Channel>, ChannelError> {
        self.channels
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ChannelError::NotFound {
                name: name.to_string(),
            })
    }

    /// Start all channels and merge their message streams.
    ///
    /// A failed health check is logged and the channel still starts; a failed
    /// start is fatal only when no channel comes up at all.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            if let Err(e) = channel.health_check().await {
                tracing::warn!(channel = channel.name(), error = %e, "Channel health check failed");
            }
            match channel.start().await {
                Ok(s) => {
                    tracing::info!(channel = channel.name(), "Channel started");
                    streams.push(s);
                }
                Err(e) => {
                    tracing::error!(channel = channel.name(), error = %e, "Channel failed to start");
                }
            }
        }

        if streams.is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "all".into(),
                reason: "no channel could be started".into(),
            });
        }

        Ok(Box::pin(stream::select_all(streams)))
    }

    /// Send a reply on the channel the message came from.
    pub async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.respond(msg, response).await
    }

    pub async fn send_status(
        &self,
        channel: &str,
        status: StatusUpdate,
        metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        self.get(channel)?.send_status(status, metadata).await
    }

    /// Shut down every channel, returning the first error after trying all.
    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        let mut first_err = None;
        for channel in &self.channels {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = channel.name(), error = %e, "Channel shutdown failed");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::StreamExt;

    use super::*;

    struct FakeChannel {
        name: &'static str,
        inbox: Vec<&'static str>,
        sent: Mutex<Vec<String>>,
    }

    impl FakeChannel {
        fn new(name: &'static str, inbox: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                inbox,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Channel for FakeChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self) -> Result<MessageStream, ChannelError> {
            let name = self.name;
            let msgs: Vec<IncomingMessage> = self
                .inbox
                .iter()
                .map(|text| IncomingMessage::new(name, "u1", *text))
                .collect();
            Ok(Box::pin(stream::iter(msgs)))
        }

        async fn respond(
            &self,
            _msg: &IncomingMessage,
            response: OutgoingResponse,
        ) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(response.content);
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ChannelError> {
            Err(ChannelError::StartupFailed {
                name: self.name.into(),
                reason: "offline".into(),
            })
        }
    }

    #[tokio::test]
    async fn merges_streams_despite_failed_health_check() {
        let mut manager = ChannelManager::new();
        manager.add(FakeChannel::new("a", vec!["one", "two"]));
        manager.add(FakeChannel::new("b", vec!["three"]));

        let stream = manager.start_all().await.unwrap();
        let mut contents: Vec<String> = stream.map(|m| m.content).collect().await;
        contents.sort();
        assert_eq!(contents, vec!["one", "three", "two"]);
    }

    #[tokio::test]
    async fn respond_routes_by_channel_name() {
        let a = FakeChannel::new("a", vec![]);
        let b = FakeChannel::new("b", vec![]);
        let mut manager = ChannelManager::new();
        manager.add(a.clone());
        manager.add(b.clone());

        let msg = IncomingMessage::new("b", "u1", "hi");
        manager
            .respond(&msg, OutgoingResponse::text("reply"))
            .await
            .unwrap();

        assert!(a.sent.lock().unwrap().is_empty());
        assert_eq!(*b.sent.lock().unwrap(), vec!["reply"]);
    }

    #[tokio::test]
    async fn respond_to_unknown_channel_fails() {
        let manager = ChannelManager::new();
        let msg = IncomingMessage::new("nowhere", "u1", "hi");
        let err = manager
            .respond(&msg, OutgoingResponse::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::NotFound { .. }));
    }

    #[tokio::test]
    async fn start_with_no_channels_fails() {
        assert!(ChannelManager::new().start_all().await.is_err());
    }
}
