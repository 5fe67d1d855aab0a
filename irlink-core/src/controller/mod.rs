//! Signal controller — the event loop tying MQTT, codec and IR driver.
//!
//! ```text
//! <prefix>/record/set ──► ir.record()            ──► record = ON
//! RecordComplete(p)   ──► encode(p)              ──► signal = "…" (retained), record = OFF
//! <prefix>/signal/set ──► signal = payload (retained)
//! <prefix>/signal     ──► current_signal = payload
//! <prefix>/play/set   ──► decode(current_signal) ──► ir.play(pulses)  (detached)
//! ```
//!
//! Inbound MQTT messages and hardware events share one channel and are
//! handled strictly one at a time, so `current_signal` needs no lock.
//! Playback is the exception: it runs on its own task and may overlap
//! with later events. Nothing is cancelled once issued.
//!
//! Failures never leave the controller. Each one is logged where it
//! happens and the next event is handled independently.

mod heartbeat;
mod options;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::discovery::{Discovery, PAYLOAD_OFF, PAYLOAD_ON};
use crate::error::IrError;
use crate::hardware::IrModule;
use crate::topic::{self, Route, TopicSet};
use crate::transport::{InboundMessage, MqttTransport, PublishOptions};

pub use heartbeat::spawn_heartbeat;
pub use options::ControllerOptions;

/// Capacity of the controller event channel.
pub const EVENT_QUEUE_DEPTH: usize = 256;

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A message on one of the subscribed control topics.
    Message(InboundMessage),
    /// The IR receiver finished a capture.
    RecordComplete(Vec<u32>),
}

pub type EventSender = mpsc::Sender<ControllerEvent>;
pub type EventReceiver = mpsc::Receiver<ControllerEvent>;

/// Create the channel feeding a controller.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(EVENT_QUEUE_DEPTH)
}

// ── SignalController ─────────────────────────────────────────────

/// Owns the single current-signal slot and drives entity state.
pub struct SignalController<T, I>
where
    T: MqttTransport + ?Sized + 'static,
    I: IrModule,
{
    transport: Arc<T>,
    ir: Arc<I>,
    discovery: Discovery,
    options: ControllerOptions,
    current_signal: Option<String>,
    heartbeat: Option<JoinHandle<()>>,
}

impl<T, I> SignalController<T, I>
where
    T: MqttTransport + ?Sized + 'static,
    I: IrModule,
{
    pub fn new(transport: Arc<T>, ir: Arc<I>, options: ControllerOptions) -> Self {
        Self {
            transport,
            ir,
            discovery: options.discovery(),
            options,
            current_signal: None,
            heartbeat: None,
        }
    }

    pub fn topics(&self) -> &TopicSet {
        self.discovery.topics()
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// The signal `play` would emit right now.
    pub fn current_signal(&self) -> Option<&str> {
        self.current_signal.as_deref()
    }

    /// Whether [`start`](Self::start) has run.
    pub fn is_started(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// Announce entities, publish default states, subscribe to the
    /// control topics and start the heartbeat.
    ///
    /// Only the first call has any effect.
    pub async fn start(&mut self) {
        if self.is_started() {
            warn!("controller already started; ignoring");
            return;
        }
        info!("starting {}", self.topics().node_id());

        debug!("setting up entities");
        for entity in self.discovery.entities() {
            if let Err(e) = self.discovery.register_entity(self.transport.as_ref(), &entity).await {
                warn!("failed to register {}: {e}", entity.object_id);
            }
        }

        debug!("setting default states");
        self.publish_state(topic::RECORD, PAYLOAD_OFF, PublishOptions::default()).await;
        self.publish_state(topic::PLAY, PAYLOAD_OFF, PublishOptions::default()).await;

        let subscriptions = self.topics().subscriptions();
        debug!("subscribing to {subscriptions:?}");
        if let Err(e) = self.transport.subscribe(&subscriptions).await {
            error!("subscribe failed: {e}");
        }

        self.heartbeat = Some(spawn_heartbeat(
            Arc::clone(&self.transport),
            self.discovery.clone(),
            self.options.heartbeat_interval(),
        ));
        info!("{} is up", self.topics().node_id());
    }

    /// Start (unless already started), then handle events until the
    /// channel closes or `shutdown` is cancelled.
    pub async fn run(mut self, mut events: EventReceiver, shutdown: CancellationToken) {
        if !self.is_started() {
            self.start().await;
        }

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => event,
            };
            match event {
                Some(event) => self.handle_event(event).await,
                None => {
                    debug!("event channel closed");
                    break;
                }
            }
        }

        info!("{} stopped", self.topics().node_id());
    }

    /// Handle one event. Failures are logged, never returned.
    pub async fn handle_event(&mut self, event: ControllerEvent) {
        if let Err(e) = self.dispatch(event).await {
            error!("{e}");
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────

    async fn dispatch(&mut self, event: ControllerEvent) -> Result<(), IrError> {
        match event {
            ControllerEvent::Message(message) => self.on_message(message).await,
            ControllerEvent::RecordComplete(pulses) => {
                self.on_record_complete(pulses).await;
                Ok(())
            }
        }
    }

    async fn on_message(&mut self, message: InboundMessage) -> Result<(), IrError> {
        debug!(topic = %message.topic, payload = %message.payload, "message");
        match self.discovery.topics().route(&message.topic) {
            Some(Route::RecordSet) => self.on_record_set().await,
            Some(Route::PlaySet) => self.on_play_set(),
            Some(Route::SignalState) => {
                self.on_signal_state(message.payload);
                Ok(())
            }
            Some(Route::SignalSet) => {
                self.publish_state(topic::SIGNAL, &message.payload, PublishOptions::RETAINED)
                    .await;
                Ok(())
            }
            None => {
                debug!("ignoring message on {}", message.topic);
                Ok(())
            }
        }
    }

    /// Arm the receiver and flip the switch on, whatever the driver says.
    async fn on_record_set(&mut self) -> Result<(), IrError> {
        debug!("starting record");
        let armed = self.ir.record().await;
        self.publish_state(topic::RECORD, PAYLOAD_ON, PublishOptions::default())
            .await;
        armed.map_err(|e| match e {
            IrError::Recording(_) => e,
            other => IrError::Recording(other.to_string()),
        })
    }

    /// Decode the current signal and hand it to the driver.
    ///
    /// Returns as soon as playback is issued; its outcome is logged by
    /// the playback task.
    fn on_play_set(&self) -> Result<(), IrError> {
        let signal = self
            .current_signal
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(IrError::UnsetSignal)?;
        info!("playing {signal}");
        let pulses = codec::decode(signal)?;

        let ir = Arc::clone(&self.ir);
        tokio::spawn(async move {
            match ir.play(pulses).await {
                Ok(()) => debug!("signal played"),
                Err(IrError::Playback(reason)) => error!("{}", IrError::Playback(reason)),
                Err(other) => error!("{}", IrError::Playback(other.to_string())),
            }
        });
        Ok(())
    }

    fn on_signal_state(&mut self, payload: String) {
        info!("setting current signal {payload}");
        self.current_signal = Some(payload);
    }

    async fn on_record_complete(&mut self, pulses: Vec<u32>) {
        let encoded = codec::encode(&pulses);
        debug!(pulses = pulses.len(), encoded = %encoded, "recording completed");

        let max = self.discovery.max_signal_len();
        if encoded.len() > max {
            warn!("{}", IrError::Oversize { len: encoded.len(), max });
        }

        self.publish_state(topic::SIGNAL, &encoded, PublishOptions::RETAINED)
            .await;
        self.publish_state(topic::RECORD, PAYLOAD_OFF, PublishOptions::default())
            .await;
    }

    async fn publish_state(&self, object_id: &str, payload: &str, opts: PublishOptions) {
        if let Err(e) = self
            .discovery
            .publish_state(self.transport.as_ref(), object_id, payload, opts)
            .await
        {
            warn!("failed to publish {object_id} state: {e}");
        }
    }
}

impl<T, I> Drop for SignalController<T, I>
where
    T: MqttTransport + ?Sized + 'static,
    I: IrModule,
{
    fn drop(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.abort();
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
