//! Console front-end for the loopback broker.
//!
//! Each stdin line is one inbound MQTT message:
//!
//! ```text
//! record                      → <prefix>/record/set
//! play                        → <prefix>/play/set
//! signal 34_68_9c             → <prefix>/signal/set
//! <full/topic> <payload…>     → sent as-is
//! ```
//!
//! Every publication is printed to stdout as `topic [r] payload`, where
//! `[r]` marks retained messages.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use irlink_core::{InboundMessage, LoopbackTransport, Publication, TopicSet};

/// Translate one console line into an inbound message.
///
/// Returns `None` for blank lines and `#` comments.
pub fn parse_line(line: &str, topics: &TopicSet) -> Option<InboundMessage> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (head, payload) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let topic = match head {
        "record" => topics.record_set.clone(),
        "play" => topics.play_set.clone(),
        "signal" => topics.signal_set.clone(),
        other => other.to_string(),
    };
    Some(InboundMessage::new(topic, payload))
}

/// Render a publication for stdout.
pub fn format_publication(p: &Publication) -> String {
    if p.retain {
        format!("{} [r] {}", p.topic, p.payload)
    } else {
        format!("{} {}", p.topic, p.payload)
    }
}

/// Feed stdin lines into the broker until end of input, then cancel
/// `shutdown`.
pub fn spawn_stdin_reader(
    broker: Arc<LoopbackTransport>,
    topics: TopicSet,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => return,
                line = lines.next_line() => line,
            };
            match line {
                Ok(Some(line)) => {
                    let Some(message) = parse_line(&line, &topics) else {
                        continue;
                    };
                    let topic = message.topic.clone();
                    if !broker.inject(message) {
                        warn!("no subscriber for {topic}");
                    }
                }
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(e) => {
                    warn!("stdin read error: {e}");
                    break;
                }
            }
        }
        shutdown.cancel();
    })
}

/// Print every publication from `tap` to stdout.
pub fn spawn_printer(mut tap: mpsc::UnboundedReceiver<Publication>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(p) = tap.recv().await {
            println!("{}", format_publication(&p));
        }
    })
}
