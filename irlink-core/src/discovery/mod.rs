//! Home Assistant MQTT discovery.
//!
//! Each entity is announced by publishing a retained JSON document on
//! `<discovery_prefix>/<component>/<node_id>/<object_id>/config`. The
//! bridge announces four entities:
//!
//! | Object id  | Component       | Purpose                          |
//! |------------|-----------------|----------------------------------|
//! | `lifeline` | `binary_sensor` | connectivity heartbeat           |
//! | `record`   | `switch`        | start a capture                  |
//! | `signal`   | `text`          | current encoded signal           |
//! | `play`     | `button`        | emit the current signal          |
//!
//! All but the heartbeat are bound to the lifeline topic, so Home
//! Assistant greys them out when the bridge stops beating.

use serde::Serialize;

use crate::codec::MAX_ENCODED_LEN;
use crate::error::IrError;
use crate::topic::{self, TopicSet};
use crate::transport::{MqttTransport, PublishOptions};

/// Payload meaning "on" for switches, sensors and the heartbeat.
pub const PAYLOAD_ON: &str = "ON";
/// Payload meaning "off".
pub const PAYLOAD_OFF: &str = "OFF";
/// Payload Home Assistant treats as "not available".
pub const PAYLOAD_NOT_AVAILABLE: &str = "unavailable";

/// Seconds without a heartbeat before the lifeline sensor expires.
pub const LIFELINE_EXPIRE_AFTER: u32 = 5;
/// Seconds before the lifeline sensor falls back to off.
pub const LIFELINE_OFF_DELAY: u32 = 3;

// ── Descriptor types ─────────────────────────────────────────────

/// Home Assistant entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    BinarySensor,
    Switch,
    Text,
    Button,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::BinarySensor => "binary_sensor",
            Component::Switch => "switch",
            Component::Text => "text",
            Component::Button => "button",
        }
    }
}

/// Device block shared by every entity of one bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub identifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_url: Option<String>,
}

/// Availability binding to the lifeline topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub topic: String,
    pub payload_available: String,
    pub payload_not_available: String,
}

impl Availability {
    pub fn lifeline(topics: &TopicSet) -> Self {
        Self {
            topic: topics.lifeline.clone(),
            payload_available: PAYLOAD_ON.into(),
            payload_not_available: PAYLOAD_NOT_AVAILABLE.into(),
        }
    }
}

/// One discovery document. Optional fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityConfig {
    #[serde(skip)]
    pub component: Component,
    #[serde(skip)]
    pub object_id: String,

    pub name: String,
    pub unique_id: String,
    pub state_topic: String,
    pub device: DeviceInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availability: Vec<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl EntityConfig {
    fn new(topics: &TopicSet, device: &DeviceInfo, component: Component, object_id: &str, name: &str) -> Self {
        Self {
            component,
            object_id: object_id.to_string(),
            name: name.to_string(),
            unique_id: format!("{}_{object_id}", topics.node_id()),
            state_topic: topics.state(object_id),
            device: device.clone(),
            command_topic: None,
            availability: Vec::new(),
            icon: None,
            device_class: None,
            entity_category: None,
            expire_after: None,
            off_delay: None,
            payload_on: None,
            payload_off: None,
            max: None,
        }
    }

    /// Serialise to the discovery JSON payload.
    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── Discovery ────────────────────────────────────────────────────

/// Builds and publishes the bridge's entities and their states.
#[derive(Debug, Clone)]
pub struct Discovery {
    discovery_prefix: String,
    topics: TopicSet,
    device: DeviceInfo,
    max_signal_len: usize,
}

impl Discovery {
    pub fn new(discovery_prefix: impl Into<String>, topics: TopicSet, device: DeviceInfo) -> Self {
        Self {
            discovery_prefix: discovery_prefix.into(),
            topics,
            device,
            max_signal_len: MAX_ENCODED_LEN,
        }
    }

    /// Longest signal text the text entity accepts.
    pub fn with_max_signal_len(mut self, max_signal_len: usize) -> Self {
        self.max_signal_len = max_signal_len;
        self
    }

    pub fn max_signal_len(&self) -> usize {
        self.max_signal_len
    }

    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    /// The four entity descriptors, heartbeat first.
    pub fn entities(&self) -> Vec<EntityConfig> {
        let topics = &self.topics;
        let availability = vec![Availability::lifeline(topics)];

        let mut lifeline = EntityConfig::new(topics, &self.device, Component::BinarySensor, topic::LIFELINE, "IR Available");
        lifeline.device_class = Some("connectivity".into());
        lifeline.entity_category = Some("diagnostic".into());
        lifeline.expire_after = Some(LIFELINE_EXPIRE_AFTER);
        lifeline.off_delay = Some(LIFELINE_OFF_DELAY);
        lifeline.payload_on = Some(PAYLOAD_ON.into());
        lifeline.payload_off = Some(PAYLOAD_OFF.into());

        let mut record = EntityConfig::new(topics, &self.device, Component::Switch, topic::RECORD, "Record Signal");
        record.command_topic = Some(topics.record_set.clone());
        record.icon = Some("mdi:record-rec".into());
        record.device_class = Some("switch".into());
        record.availability = availability.clone();

        let mut signal = EntityConfig::new(topics, &self.device, Component::Text, topic::SIGNAL, "Signal");
        signal.command_topic = Some(topics.signal_set.clone());
        signal.icon = Some("mdi:broadcast".into());
        signal.max = Some(self.max_signal_len);
        signal.availability = availability.clone();

        let mut play = EntityConfig::new(topics, &self.device, Component::Button, topic::PLAY, "Play Signal");
        play.command_topic = Some(topics.play_set.clone());
        play.icon = Some("mdi:play".into());
        play.availability = availability;

        vec![lifeline, record, signal, play]
    }

    /// Announce one entity (retained config document).
    pub async fn register_entity<T>(&self, transport: &T, entity: &EntityConfig) -> Result<(), IrError>
    where
        T: MqttTransport + ?Sized,
    {
        let topic = self
            .topics
            .discovery(&self.discovery_prefix, entity.component.as_str(), &entity.object_id);
        let payload = entity.to_json()?;
        transport.publish(&topic, &payload, PublishOptions::RETAINED).await
    }

    /// Publish an entity state on `<prefix>/<object_id>`.
    pub async fn publish_state<T>(
        &self,
        transport: &T,
        object_id: &str,
        payload: &str,
        opts: PublishOptions,
    ) -> Result<(), IrError>
    where
        T: MqttTransport + ?Sized,
    {
        transport.publish(&self.topics.state(object_id), payload, opts).await
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;
    use serde_json::Value;

    fn discovery() -> Discovery {
        let topics = TopicSet::new("irlink", "IrBridge0");
        let device = DeviceInfo {
            name: "IR".into(),
            manufacturer: "irlink".into(),
            model: "IrBridge0".into(),
            identifiers: vec!["IrBridge0".into()],
            configuration_url: None,
        };
        Discovery::new("homeassistant", topics, device)
    }

    fn json(entity: &EntityConfig) -> Value {
        serde_json::from_str(&entity.to_json().unwrap()).unwrap()
    }

    #[test]
    fn four_entities_in_order() {
        let components: Vec<_> = discovery().entities().iter().map(|e| e.component).collect();
        assert_eq!(
            components,
            vec![
                Component::BinarySensor,
                Component::Switch,
                Component::Text,
                Component::Button
            ]
        );
    }

    #[test]
    fn lifeline_descriptor() {
        let entities = discovery().entities();
        let v = json(&entities[0]);
        assert_eq!(v["device_class"], "connectivity");
        assert_eq!(v["expire_after"], 5);
        assert_eq!(v["off_delay"], 3);
        assert_eq!(v["entity_category"], "diagnostic");
        assert_eq!(v["state_topic"], "irlink/IrBridge0/lifeline");
        assert!(v.get("availability").is_none());
        assert!(v.get("command_topic").is_none());
    }

    #[test]
    fn controls_bound_to_lifeline() {
        for entity in discovery().entities().iter().skip(1) {
            let v = json(entity);
            assert_eq!(v["availability"][0]["topic"], "irlink/IrBridge0/lifeline");
            assert_eq!(v["availability"][0]["payload_available"], "ON");
            assert!(v["command_topic"].as_str().unwrap().ends_with("/set"));
        }
    }

    #[test]
    fn text_entity_limits_length() {
        let entities = discovery().entities();
        let v = json(&entities[2]);
        assert_eq!(v["max"], 255);
        assert_eq!(v["unique_id"], "IrBridge0_signal");
        assert_eq!(v["device"]["identifiers"][0], "IrBridge0");
        assert!(v["device"].get("configuration_url").is_none());
    }

    #[test]
    fn text_entity_follows_configured_limit() {
        let d = discovery().with_max_signal_len(400);
        assert_eq!(d.max_signal_len(), 400);
        let v = json(&d.entities()[2]);
        assert_eq!(v["max"], 400);
    }

    #[tokio::test]
    async fn register_publishes_retained_config() {
        let d = discovery();
        let broker = LoopbackTransport::new();
        let entities = d.entities();
        d.register_entity(&broker, &entities[1]).await.unwrap();

        let pubs = broker.publications();
        assert_eq!(pubs.len(), 1);
        assert_eq!(pubs[0].topic, "homeassistant/switch/IrBridge0/record/config");
        assert!(pubs[0].retain);
    }

    #[tokio::test]
    async fn publish_state_uses_prefix() {
        let d = discovery();
        let broker = LoopbackTransport::new();
        d.publish_state(&broker, topic::RECORD, PAYLOAD_OFF, PublishOptions::default())
            .await
            .unwrap();
        assert_eq!(broker.published_to("irlink/IrBridge0/record"), vec!["OFF"]);
    }
}
