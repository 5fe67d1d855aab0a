//! Simulated IR transceiver.
//!
//! Stands in for real hardware: arming the receiver delivers the
//! configured capture after a delay, and playback takes as long as the
//! pulse train would (capped).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use irlink_core::{ControllerEvent, EventSender, IrError, IrModule};

use crate::config::SimulatorConfig;

pub struct SimulatedIr {
    config: SimulatorConfig,
    events: EventSender,
}

impl SimulatedIr {
    pub fn new(config: SimulatorConfig, events: EventSender) -> Self {
        Self { config, events }
    }

    /// How long emitting `pulses` takes, capped at `max_play_ms`.
    pub fn play_duration(&self, pulses: &[u32]) -> Duration {
        let total_us: u64 = pulses.iter().map(|&p| u64::from(p)).sum();
        Duration::from_micros(total_us).min(Duration::from_millis(self.config.max_play_ms))
    }
}

#[async_trait]
impl IrModule for SimulatedIr {
    async fn record(&self) -> Result<(), IrError> {
        if self.events.is_closed() {
            return Err(IrError::ChannelClosed);
        }
        let capture = self.config.capture.clone();
        let delay = Duration::from_millis(self.config.capture_delay_ms);
        let events = self.events.clone();
        debug!("receiver armed; capture in {delay:?}");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = events.send(ControllerEvent::RecordComplete(capture)).await {
                warn!("capture dropped: {}", IrError::from(e));
            }
        });
        Ok(())
    }

    async fn play(&self, pulses: Vec<u32>) -> Result<(), IrError> {
        if pulses.is_empty() {
            return Err(IrError::Playback("empty pulse buffer".into()));
        }
        let duration = self.play_duration(&pulses);
        debug!("emitting {} pulses over {duration:?}", pulses.len());
        tokio::time::sleep(duration).await;
        Ok(())
    }
}
