//! IR transceiver seam.
//!
//! A driver implements [`IrModule`]. Recording is two-phase: `record`
//! only arms the receiver, and the captured pulses arrive later as a
//! [`ControllerEvent::RecordComplete`](crate::controller::ControllerEvent)
//! pushed by the driver through the sender it was given. Playback
//! resolves once the signal has been emitted.
//!
//! Neither operation can be cancelled once issued.

use async_trait::async_trait;

use crate::error::IrError;

#[async_trait]
pub trait IrModule: Send + Sync + 'static {
    /// Arm the receiver for one capture.
    ///
    /// Called again while a capture is pending, the driver decides
    /// whether to restart it or ignore the request.
    async fn record(&self) -> Result<(), IrError>;

    /// Emit `pulses` and resolve when done.
    async fn play(&self, pulses: Vec<u32>) -> Result<(), IrError>;
}
