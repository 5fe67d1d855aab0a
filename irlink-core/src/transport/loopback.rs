//! In-process broker stand-in.
//!
//! [`LoopbackTransport`] behaves like a single-client MQTT broker:
//!
//! - every publication is recorded (and optionally forwarded to a tap);
//! - retained messages are kept per topic and replayed on subscribe;
//! - a publication on a subscribed topic is echoed back into the
//!   attached controller event channel, exactly like a real broker
//!   delivering our own retained state back to us.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::controller::{ControllerEvent, EventSender};
use crate::error::IrError;
use crate::transport::{InboundMessage, MqttTransport, PublishOptions};

/// One recorded publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

#[derive(Default)]
struct BrokerState {
    publications: Vec<Publication>,
    subscriptions: HashSet<String>,
    retained: HashMap<String, String>,
    offline: bool,
}

/// Loopback MQTT transport. See the module docs.
#[derive(Default)]
pub struct LoopbackTransport {
    state: Mutex<BrokerState>,
    events: Mutex<Option<EventSender>>,
    tap: Mutex<Option<mpsc::UnboundedSender<Publication>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver inbound messages to this controller event channel.
    pub fn attach(&self, events: EventSender) {
        *lock(&self.events) = Some(events);
    }

    /// Forward a copy of every publication to the returned receiver.
    pub fn tap(&self) -> mpsc::UnboundedReceiver<Publication> {
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.tap) = Some(tx);
        rx
    }

    /// Simulate a broker outage: publish and subscribe fail while set.
    pub fn set_offline(&self, offline: bool) {
        lock(&self.state).offline = offline;
    }

    /// Inject a message from another client.
    ///
    /// Returns `true` if the topic is subscribed and the message was
    /// handed to the controller.
    pub fn inject(&self, message: InboundMessage) -> bool {
        let subscribed = lock(&self.state).subscriptions.contains(&message.topic);
        if !subscribed {
            debug!("dropping message on unsubscribed topic {}", message.topic);
            return false;
        }
        self.deliver(message)
    }

    /// Every publication so far, in order.
    pub fn publications(&self) -> Vec<Publication> {
        lock(&self.state).publications.clone()
    }

    /// Payloads published on `topic`, in order.
    pub fn published_to(&self, topic: &str) -> Vec<String> {
        lock(&self.state)
            .publications
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload.clone())
            .collect()
    }

    /// Current retained message on `topic`.
    pub fn retained(&self, topic: &str) -> Option<String> {
        lock(&self.state).retained.get(topic).cloned()
    }

    /// Subscribed topics, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        let mut subs: Vec<String> = lock(&self.state).subscriptions.iter().cloned().collect();
        subs.sort();
        subs
    }

    fn deliver(&self, message: InboundMessage) -> bool {
        let Some(events) = lock(&self.events).clone() else {
            return false;
        };
        match events.try_send(ControllerEvent::Message(message)) {
            Ok(()) => true,
            Err(TrySendError::Full(ControllerEvent::Message(m))) => {
                warn!("controller queue full; dropping message on {}", m.topic);
                false
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl MqttTransport for LoopbackTransport {
    async fn publish(&self, topic: &str, payload: &str, opts: PublishOptions) -> Result<(), IrError> {
        let publication = Publication {
            topic: topic.to_string(),
            payload: payload.to_string(),
            retain: opts.retain,
        };

        let echo = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(IrError::Transport(format!("broker offline, cannot publish to {topic}")));
            }
            state.publications.push(publication.clone());
            if opts.retain {
                state.retained.insert(publication.topic.clone(), publication.payload.clone());
            }
            state.subscriptions.contains(topic)
        };

        if let Some(tap) = lock(&self.tap).as_ref() {
            let _ = tap.send(publication);
        }

        if echo {
            self.deliver(InboundMessage::new(topic, payload));
        }
        Ok(())
    }

    async fn subscribe(&self, topics: &[String]) -> Result<(), IrError> {
        let replay: Vec<InboundMessage> = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(IrError::Transport("broker offline, cannot subscribe".into()));
            }
            let mut replay = Vec::new();
            for topic in topics {
                if state.subscriptions.insert(topic.clone()) {
                    if let Some(payload) = state.retained.get(topic) {
                        replay.push(InboundMessage::new(topic.clone(), payload.clone()));
                    }
                }
            }
            replay
        };

        for message in replay {
            self.deliver(message);
        }
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // Poisoning is ignored; the guarded state is plain data.
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ── Tests ────────────────────────────────────────────────────────
