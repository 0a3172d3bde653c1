//! Channel-based event source.
//!
//! Receives host events through an in-process channel. This is the
//! integration point for embedding the monitor in another program that
//! already observes the host.

use tokio::sync::mpsc;

use super::{HostEvent, SaveEventSource};

/// A source fed by an unbounded mpsc channel.
///
/// ```
/// use edit_count_monitor::ChannelEvents;
///
/// let (tx, source) = ChannelEvents::create("bridge");
/// ```
#[derive(Debug)]
pub struct ChannelEvents {
    receiver: mpsc::UnboundedReceiver<HostEvent>,
    description: String,
    disconnected: bool,
}

impl ChannelEvents {
    /// Wrap an existing receiver.
    pub fn new(receiver: mpsc::UnboundedReceiver<HostEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            disconnected: false,
        }
    }

    /// Create a channel pair for sending events to a `ChannelEvents`.
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<HostEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl SaveEventSource for ChannelEvents {
    fn poll(&mut self) -> Option<HostEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.disconnected
            .then(|| "Event channel disconnected".to_string())
    }
}
