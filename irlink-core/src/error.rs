//! Domain-specific error types for the IR bridge.
//!
//! Every failure in the controller is handled where it occurs and
//! reported through `tracing`; these types exist so that each failure
//! is typed and carries enough context to be logged usefully.

use thiserror::Error;

use crate::codec::CodecError;

/// The canonical error type for the IR bridge.
#[derive(Debug, Error)]
pub enum IrError {
    // ── Signal Errors ────────────────────────────────────────────
    /// The stored signal text could not be decoded into pulses.
    #[error("invalid signal: {0}")]
    Decode(#[from] CodecError),

    /// Play was requested before any signal was recorded or set.
    #[error("cannot play an unset signal")]
    UnsetSignal,

    /// The encoded signal is longer than the text entity accepts.
    #[error("encoded signal too big: {len} characters (max {max})")]
    Oversize { len: usize, max: usize },

    // ── Hardware Errors ──────────────────────────────────────────
    /// The IR driver failed while emitting a signal.
    #[error("failed to play signal: {0}")]
    Playback(String),

    /// The IR driver refused to start a recording.
    #[error("failed to start recording: {0}")]
    Recording(String),

    // ── Transport Errors ─────────────────────────────────────────
    /// The MQTT collaborator failed to publish or subscribe.
    #[error("transport error: {0}")]
    Transport(String),

    /// A discovery payload could not be serialised.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The controller event channel was closed.
    #[error("channel closed")]
    ChannelClosed,

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for IrError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        IrError::ChannelClosed
    }
}

impl From<serde_json::Error> for IrError {
    fn from(e: serde_json::Error) -> Self {
        IrError::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = IrError::UnsetSignal;
        assert!(e.to_string().contains("unset"));

        let e = IrError::Oversize { len: 300, max: 255 };
        assert!(e.to_string().contains("300"));
        assert!(e.to_string().contains("255"));
    }

    #[test]
    fn from_codec_error() {
        let e: IrError = CodecError::EmptyToken { index: 2 }.into();
        assert!(matches!(e, IrError::Decode(CodecError::EmptyToken { index: 2 })));
        assert!(e.to_string().starts_with("invalid signal"));
    }

    #[tokio::test]
    async fn from_send_error() {
        let (tx, rx) = tokio::sync::mpsc::channel::<u8>(1);
        drop(rx);
        let e: IrError = tx.send(1).await.unwrap_err().into();
        assert!(matches!(e, IrError::ChannelClosed));
    }
}
