//! Client <-> hosting-layer message channel
//!
//! On device the hosting layer is the platform SDK; for local development
//! and integration testing the same contract is served over NATS.

mod nats;

pub use nats::NatsChannel;

use crate::protocol::Message;
use anyhow::Result;

/// Outcome of one fire-and-forget send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    /// The hosting layer refused the message, e.g. throttled or oversized
    Rejected { status: u16 },
}

/// Asynchronous, at-most-once transport for [`Message`] frames.
#[async_trait::async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, msg: Message) -> Result<DeliveryStatus>;
}
