//! # irlink-core
//!
//! Core library for bridging an IR transceiver to Home Assistant over
//! MQTT.
//!
//! This crate contains:
//! - **Codec**: `encode` / `decode` between pulse buffers and compact
//!   base-32 text
//! - **Controller**: `SignalController`, the event loop behind the
//!   record switch, signal text, play button and lifeline heartbeat
//! - **Discovery**: Home Assistant entity descriptors
//! - **Topic**: per-instance topic layout
//! - **Transport / Hardware**: the `MqttTransport` and `IrModule` seams,
//!   plus `LoopbackTransport`, an in-process broker stand-in
//! - **Error**: `IrError` — typed, `thiserror`-based error hierarchy

pub mod codec;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod hardware;
pub mod topic;
pub mod transport;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{CodecError, MAX_ENCODED_LEN, decode, encode};
pub use controller::{
    ControllerEvent, ControllerOptions, EventReceiver, EventSender, SignalController,
    event_channel,
};
pub use discovery::{Component, DeviceInfo, Discovery, EntityConfig};
pub use error::IrError;
pub use hardware::IrModule;
pub use topic::{Route, TopicSet};
pub use transport::{InboundMessage, LoopbackTransport, MqttTransport, Publication, PublishOptions};
