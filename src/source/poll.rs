//! Poll-based event source.
//!
//! Some hosts expose no save events, only their current state. This adapter
//! probes that state on a fixed interval and synthesises events from the
//! edges it sees.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{HostEvent, HostStatus, SaveEventSource};
use crate::error::MonitorError;

/// Default interval between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Reads the host's current status.
pub trait SaveStatusProbe: Send + Debug {
    fn probe(&mut self) -> Result<HostStatus, MonitorError>;

    fn description(&self) -> String;
}

/// Reads [`HostStatus`] from a JSON file the host keeps up to date.
#[derive(Debug)]
pub struct StatusFileProbe {
    path: PathBuf,
}

impl StatusFileProbe {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStatusProbe for StatusFileProbe {
    fn probe(&mut self) -> Result<HostStatus, MonitorError> {
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| MonitorError::unavailable(format!("Parse error: {}", e)))
    }

    fn description(&self) -> String {
        format!("status file: {}", self.path.display())
    }
}

/// Turns periodic [`HostStatus`] probes into [`HostEvent`]s.
///
/// - `saving` false → true emits `SaveStarted`
/// - `saving` true → false emits `SaveCompleted` (once per edge)
/// - any change in `pending` emits `ActionsChanged`
///
/// A failed probe is recorded and otherwise ignored: the saving edge is
/// judged against the last successful probe.
#[derive(Debug)]
pub struct PollingSaveSource<P: SaveStatusProbe> {
    probe: P,
    interval: Duration,
    last_probe: Option<Instant>,
    was_saving: bool,
    last_pending: Option<u32>,
    queue: VecDeque<HostEvent>,
    description: String,
    last_error: Option<String>,
}

impl<P: SaveStatusProbe> PollingSaveSource<P> {
    pub fn new(probe: P, interval: Duration) -> Self {
        let description = format!("poll: {}", probe.description());
        Self {
            probe,
            interval,
            last_probe: None,
            was_saving: false,
            last_pending: None,
            queue: VecDeque::new(),
            description,
            last_error: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Probe now, regardless of the interval, queueing any resulting events.
    pub fn tick(&mut self) {
        self.last_probe = Some(Instant::now());

        let status = match self.probe.probe() {
            Ok(status) => {
                self.last_error = None;
                status
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };

        if status.saving && !self.was_saving {
            self.queue.push_back(HostEvent::SaveStarted);
        } else if !status.saving && self.was_saving {
            debug!("Save finished (failed: {})", status.save_failed);
            self.queue.push_back(HostEvent::SaveCompleted {
                success: !status.save_failed,
            });
        }
        self.was_saving = status.saving;

        if self.last_pending != Some(status.pending) {
            self.queue.push_back(HostEvent::ActionsChanged {
                pending: status.pending,
            });
            self.last_pending = Some(status.pending);
        }
    }

    fn due(&self) -> bool {
        self.last_probe.is_none_or(|last| last.elapsed() >= self.interval)
    }
}

impl<P: SaveStatusProbe> SaveEventSource for PollingSaveSource<P> {
    fn poll(&mut self) -> Option<HostEvent> {
        if self.queue.is_empty() && self.due() {
            self.tick();
        }
        self.queue.pop_front()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
