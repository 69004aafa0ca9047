use super::{DeliveryStatus, MessageChannel};
use crate::protocol::Message;
use anyhow::{Context, Result};
use async_nats::Client;
use tracing::info;

/// NATS-backed message channel for local development.
///
/// Client-to-skill frames are published on `skill.inbox.session-{id}`;
/// skill-to-client frames arrive on `skill.outbox.session-{id}`.
pub struct NatsChannel {
    client: Client,
    session_id: String,
}

impl NatsChannel {
    /// Connect to the NATS server.
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    /// Subscribe to frames the skill backend pushes to this session.
    pub async fn subscribe_inbound(&self) -> Result<async_nats::Subscriber> {
        let subject = format!("skill.outbox.session-{}", self.session_id);

        info!("Subscribing to inbound messages on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to inbound messages")?;

        Ok(subscriber)
    }

    /// Publish a directive-borne frame toward the client, the backend half
    /// of the same subject pair.
    pub async fn publish_outbound(&self, msg: &Message) -> Result<()> {
        let subject = format!("skill.outbox.session-{}", self.session_id);
        let payload = serde_json::to_vec(msg)?;

        self.client
            .publish(subject, payload.into())
            .await
            .context("Failed to publish outbound message")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageChannel for NatsChannel {
    async fn send(&self, msg: Message) -> Result<DeliveryStatus> {
        let subject = format!("skill.inbox.session-{}", self.session_id);
        let payload = serde_json::to_vec(&msg)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish message to skill inbox")?;

        info!("Published message frame to {}", subject);

        Ok(DeliveryStatus::Delivered)
    }
}
