//! Lifeline heartbeat.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::trace;

use crate::discovery::{Discovery, PAYLOAD_ON};
use crate::topic;
use crate::transport::{MqttTransport, PublishOptions};

/// Publish `ON` on the lifeline topic every `period`, the first beat
/// one period from now.
///
/// Runs until the returned handle is aborted. Publish failures are left
/// to the transport; the next beat is attempted regardless.
pub fn spawn_heartbeat<T>(transport: Arc<T>, discovery: Discovery, period: Duration) -> JoinHandle<()>
where
    T: MqttTransport + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            if let Err(e) = discovery
                .publish_state(transport.as_ref(), topic::LIFELINE, PAYLOAD_ON, PublishOptions::default())
                .await
            {
                trace!("heartbeat not delivered: {e}");
            }
        }
    })
}
