//! Stream-based event source.
//!
//! Receives host events from an async byte stream, such as a TCP connection
//! to a browser-side bridge.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{HostEvent, SaveEventSource};

/// A source that reads newline-delimited JSON [`HostEvent`]s from a stream.
///
/// A background task does the reading; `poll()` only drains what it has
/// already parsed. Lines that do not parse are skipped.
///
/// ```
/// use std::io::Cursor;
/// use edit_count_monitor::StreamEvents;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"event\":\"save_started\"}\n";
/// let source = StreamEvents::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamEvents {
    receiver: mpsc::Receiver<HostEvent>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamEvents {
    /// Spawn a background task that reads from the given async reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("Host event stream closed");
                        set_error(&error_handle, Some("Connection closed".to_string()));
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<HostEvent>(trimmed) {
                            Ok(event) => {
                                set_error(&error_handle, None);
                                if tx.send(event).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Skipping malformed host event: {}", e);
                                set_error(&error_handle, Some(format!("Parse error: {}", e)));
                            }
                        }
                    }
                    Err(e) => {
                        set_error(&error_handle, Some(format!("Read error: {}", e)));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }
}

fn set_error(slot: &Mutex<Option<String>>, value: Option<String>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = value;
    }
}

impl SaveEventSource for StreamEvents {
    fn poll(&mut self) -> Option<HostEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => None,
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }
}
