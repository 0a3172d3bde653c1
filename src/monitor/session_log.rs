//! Capped local log of editing sessions.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of sessions to keep.
pub const MAX_SESSION_LOG_SIZE: usize = 100;

/// Summary of one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogEntry {
    /// Unix time in milliseconds when the entry was recorded.
    pub timestamp_ms: u64,
    pub duration_seconds: f64,
    pub distance_km: f64,
}

impl SessionLogEntry {
    /// Entry stamped with the current time.
    pub fn now(duration_seconds: f64, distance_km: f64) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            timestamp_ms,
            duration_seconds,
            distance_km,
        }
    }
}

/// Append-only session log backed by a JSON file.
///
/// Only the newest [`MAX_SESSION_LOG_SIZE`] entries are kept.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    entries: VecDeque<SessionLogEntry>,
}

impl SessionLog {
    /// Load the log at `path`. A missing file is an empty log.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                let mut entries: VecDeque<SessionLogEntry> = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse session log {}", path.display()))?;
                while entries.len() > MAX_SESSION_LOG_SIZE {
                    entries.pop_front();
                }
                entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read session log {}", path.display()))
            }
        };

        debug!("Loaded {} session log entries from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> impl Iterator<Item = &SessionLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently appended entry.
    pub fn latest(&self) -> Option<&SessionLogEntry> {
        self.entries.back()
    }

    /// Append an entry, dropping the oldest one when the log is full.
    pub fn append(&mut self, entry: SessionLogEntry) {
        self.entries.push_back(entry);
        if self.entries.len() > MAX_SESSION_LOG_SIZE {
            self.entries.pop_front();
        }
    }

    /// Write the log back to its file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session log {}", self.path.display()))?;
        Ok(())
    }
}
