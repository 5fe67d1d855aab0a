//! MQTT transport seam.
//!
//! The controller never talks to a broker directly. Outbound traffic
//! goes through [`MqttTransport`]; inbound messages are pushed by the
//! transport into the controller's event channel as
//! [`ControllerEvent::Message`](crate::controller::ControllerEvent).
//!
//! The transport is assumed reliable, at-least-once and in order per
//! topic. Nothing is promised across topics.

pub mod loopback;

use async_trait::async_trait;

use crate::error::IrError;

pub use loopback::{LoopbackTransport, Publication};

/// Per-publication options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Ask the broker to keep the message for late subscribers.
    pub retain: bool,
}

impl PublishOptions {
    pub const RETAINED: Self = Self { retain: true };
}

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound half of an MQTT client.
#[async_trait]
pub trait MqttTransport: Send + Sync {
    /// Publish `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: &str, opts: PublishOptions) -> Result<(), IrError>;

    /// Subscribe to every topic in `topics`.
    async fn subscribe(&self, topics: &[String]) -> Result<(), IrError>;
}
