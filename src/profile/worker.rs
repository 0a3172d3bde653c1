//! Background profile fetching.
//!
//! All fetches for a session go through one worker task, so at most one
//! request is in flight and results arrive in the order they were asked
//! for. Requests that pile up while a fetch is running are merged into a
//! single follow-up fetch; the newest profile is all that matters.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::provider::ProfileProvider;
use crate::error::MonitorError;
use crate::monitor::{EditSnapshot, ObservationKind};

/// Outcome of one fetch, tagged with why it was requested.
#[derive(Debug)]
pub struct FetchResult {
    pub kind: ObservationKind,
    pub result: Result<EditSnapshot, MonitorError>,
}

/// Handle to the background fetch task.
#[derive(Debug)]
pub struct FetchWorker {
    requests: mpsc::UnboundedSender<ObservationKind>,
    results: mpsc::UnboundedReceiver<FetchResult>,
    description: String,
    handle: JoinHandle<()>,
}

impl FetchWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(provider: Arc<dyn ProfileProvider>, user: &str) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ObservationKind>();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let description = provider.description();
        let user = user.to_string();

        let handle = tokio::spawn(async move {
            while let Some(mut kind) = request_rx.recv().await {
                // Fold anything queued behind this request into one fetch.
                let mut merged = 0;
                while let Ok(next) = request_rx.try_recv() {
                    kind = merge_kinds(kind, next);
                    merged += 1;
                }
                if merged > 0 {
                    debug!("Merged {} queued profile fetch requests", merged);
                }

                let result = provider.fetch(&user).await;
                if let Err(ref e) = result {
                    warn!("Profile fetch failed: {}", e);
                }

                if result_tx.send(FetchResult { kind, result }).is_err() {
                    // Receiver dropped
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            results: result_rx,
            description,
            handle,
        }
    }

    /// Ask for a fetch. Returns false if the worker has stopped.
    pub fn request(&self, kind: ObservationKind) -> bool {
        self.requests.send(kind).is_ok()
    }

    /// Take a finished result without waiting.
    pub fn try_result(&mut self) -> Option<FetchResult> {
        self.results.try_recv().ok()
    }

    /// Wait for the next finished result.
    pub async fn next_result(&mut self) -> Option<FetchResult> {
        self.results.recv().await
    }

    /// Description of the underlying provider.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A merged request counts as a save if any of its parts was one.
fn merge_kinds(a: ObservationKind, b: ObservationKind) -> ObservationKind {
    if a == ObservationKind::SaveAttempt || b == ObservationKind::SaveAttempt {
        ObservationKind::SaveAttempt
    } else {
        ObservationKind::Refresh
    }
}
