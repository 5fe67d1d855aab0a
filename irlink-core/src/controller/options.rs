//! Controller options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::MAX_ENCODED_LEN;
use crate::discovery::{DeviceInfo, Discovery};
use crate::topic::TopicSet;

/// Per-instance settings for [`SignalController`](super::SignalController).
///
/// Deserialisable so a binary can embed it as a config section; every
/// field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Suffix distinguishing several bridges on one broker.
    pub unique_id: String,
    /// Enable debug-level logging.
    pub debug: bool,
    /// Node name; the node id is `node_name + unique_id`.
    pub node_name: String,
    /// Root of the state/command topic tree.
    pub topic_root: String,
    /// Home Assistant discovery prefix.
    pub discovery_prefix: String,
    /// Heartbeat period in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Encoded length above which a recording is flagged as oversize.
    pub max_signal_len: usize,
    /// Device name shown in Home Assistant.
    pub device_name: String,
    /// Device manufacturer shown in Home Assistant.
    pub manufacturer: String,
    /// Optional link shown on the device page.
    pub configuration_url: Option<String>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            unique_id: "0".into(),
            debug: false,
            node_name: "IrBridge".into(),
            topic_root: "irlink".into(),
            discovery_prefix: "homeassistant".into(),
            heartbeat_interval_ms: 2500,
            max_signal_len: MAX_ENCODED_LEN,
            device_name: "IR".into(),
            manufacturer: "irlink".into(),
            configuration_url: None,
        }
    }
}

impl ControllerOptions {
    /// Options with a specific instance suffix and everything else default.
    pub fn with_unique_id(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..Self::default()
        }
    }

    pub fn node_id(&self) -> String {
        format!("{}{}", self.node_name, self.unique_id)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    pub fn topics(&self) -> TopicSet {
        TopicSet::new(&self.topic_root, self.node_id())
    }

    pub fn device(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.device_name.clone(),
            manufacturer: self.manufacturer.clone(),
            model: self.node_id(),
            identifiers: vec![self.node_id()],
            configuration_url: self.configuration_url.clone(),
        }
    }

    pub fn discovery(&self) -> Discovery {
        Discovery::new(self.discovery_prefix.clone(), self.topics(), self.device())
            .with_max_signal_len(self.max_signal_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ControllerOptions::default();
        assert_eq!(opts.unique_id, "0");
        assert!(!opts.debug);
        assert_eq!(opts.node_id(), "IrBridge0");
        assert_eq!(opts.heartbeat_interval(), Duration::from_millis(2500));
        assert_eq!(opts.max_signal_len, 255);
    }

    #[test]
    fn unique_id_changes_every_topic() {
        let a = ControllerOptions::with_unique_id("1").topics();
        let b = ControllerOptions::with_unique_id("2").topics();
        assert_ne!(a.lifeline, b.lifeline);
        assert_eq!(a.lifeline, "irlink/IrBridge1/lifeline");
    }

    #[test]
    fn partial_deserialise_keeps_defaults() {
        let opts: ControllerOptions = serde_json::from_str(r#"{"unique_id":"kitchen","debug":true}"#).unwrap();
        assert_eq!(opts.node_id(), "IrBridgekitchen");
        assert!(opts.debug);
        assert_eq!(opts.heartbeat_interval_ms, 2500);
    }

    #[test]
    fn signal_limit_reaches_discovery() {
        let opts = ControllerOptions {
            max_signal_len: 400,
            ..ControllerOptions::default()
        };
        let signal = &opts.discovery().entities()[2];
        assert_eq!(signal.max, Some(400));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let opts = ControllerOptions {
            heartbeat_interval_ms: 0,
            ..ControllerOptions::default()
        };
        assert_eq!(opts.heartbeat_interval(), Duration::from_millis(1));
    }
}
