//! MQTT topic layout for one bridge instance.
//!
//! ```text
//! <root>/<node_id>/lifeline      heartbeat (publish)
//! <root>/<node_id>/record/set    start recording (subscribe)
//! <root>/<node_id>/record        record switch state (publish)
//! <root>/<node_id>/signal/set    user-set signal text (subscribe)
//! <root>/<node_id>/signal        signal text state (publish + subscribe, retained)
//! <root>/<node_id>/play/set      play current signal (subscribe)
//! <root>/<node_id>/play          play button state (publish)
//! ```

/// Object id of the heartbeat binary sensor.
pub const LIFELINE: &str = "lifeline";
/// Object id of the record switch.
pub const RECORD: &str = "record";
/// Object id of the signal text entity.
pub const SIGNAL: &str = "signal";
/// Object id of the play button.
pub const PLAY: &str = "play";

const SET_SUFFIX: &str = "set";

/// Which control topic an inbound message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    RecordSet,
    PlaySet,
    SignalState,
    SignalSet,
}

/// Every topic used by one controller instance, derived once from the
/// node identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    node_id: String,
    prefix: String,
    pub lifeline: String,
    pub record_set: String,
    pub record_state: String,
    pub signal_set: String,
    pub signal_state: String,
    pub play_set: String,
    pub play_state: String,
}

impl TopicSet {
    /// Derive the topic layout for `node_id` under `root`.
    pub fn new(root: &str, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let root = root.trim_end_matches('/');
        let prefix = if root.is_empty() {
            node_id.clone()
        } else {
            format!("{root}/{node_id}")
        };

        Self {
            lifeline: format!("{prefix}/{LIFELINE}"),
            record_set: format!("{prefix}/{RECORD}/{SET_SUFFIX}"),
            record_state: format!("{prefix}/{RECORD}"),
            signal_set: format!("{prefix}/{SIGNAL}/{SET_SUFFIX}"),
            signal_state: format!("{prefix}/{SIGNAL}"),
            play_set: format!("{prefix}/{PLAY}/{SET_SUFFIX}"),
            play_state: format!("{prefix}/{PLAY}"),
            node_id,
            prefix,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// State topic for an entity object id.
    pub fn state(&self, object_id: &str) -> String {
        format!("{}/{object_id}", self.prefix)
    }

    /// Home Assistant discovery config topic for an entity.
    pub fn discovery(&self, discovery_prefix: &str, component: &str, object_id: &str) -> String {
        format!(
            "{}/{component}/{}/{object_id}/config",
            discovery_prefix.trim_end_matches('/'),
            self.node_id
        )
    }

    /// Classify an inbound topic; `None` for anything not ours.
    pub fn route(&self, topic: &str) -> Option<Route> {
        if topic == self.record_set {
            Some(Route::RecordSet)
        } else if topic == self.play_set {
            Some(Route::PlaySet)
        } else if topic == self.signal_state {
            Some(Route::SignalState)
        } else if topic == self.signal_set {
            Some(Route::SignalSet)
        } else {
            None
        }
    }

    /// Control topics the controller subscribes to.
    pub fn subscriptions(&self) -> Vec<String> {
        vec![
            self.record_set.clone(),
            self.signal_set.clone(),
            self.play_set.clone(),
            self.signal_state.clone(),
        ]
    }
}
