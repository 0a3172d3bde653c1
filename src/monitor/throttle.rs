//! Throttle detection from consecutive profile snapshots.
//!
//! Every completed save is followed by a profile fetch. If the counts did
//! not move since the previous save, the save "made no progress". A run of
//! such saves is a hint that the editing service has stopped crediting edits
//! (throttling). The run length is quantised into a [`Tier`].

use serde::{Deserialize, Serialize};

use super::snapshot::EditSnapshot;
use crate::error::MonitorError;

/// Run lengths at which the tier escalates.
///
/// Bands are `[0, caution)` → OK, `[caution, alert)` → CAUTION,
/// `[alert, ∞)` → ALERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Consecutive no-progress saves that trigger a caution.
    pub caution: u32,
    /// Consecutive no-progress saves that trigger an alert.
    pub alert: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            caution: 5,
            alert: 10,
        }
    }
}

impl Thresholds {
    /// Build thresholds, rejecting bands that overlap or are empty.
    pub fn new(caution: u32, alert: u32) -> Result<Self, MonitorError> {
        let thresholds = Self { caution, alert };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that both thresholds are positive and strictly ascending.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.caution == 0 {
            return Err(MonitorError::Config(
                "caution threshold must be at least 1".to_string(),
            ));
        }
        if self.alert <= self.caution {
            return Err(MonitorError::Config(format!(
                "alert threshold ({}) must be greater than caution threshold ({})",
                self.alert, self.caution
            )));
        }
        Ok(())
    }

    /// Map a no-progress run length to its tier.
    pub fn tier_for(&self, consecutive_no_progress: u32) -> Tier {
        if consecutive_no_progress >= self.alert {
            Tier::Alert
        } else if consecutive_no_progress >= self.caution {
            Tier::Caution
        } else {
            Tier::Ok
        }
    }
}

/// Severity of the throttle warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Ok,
    Caution,
    Alert,
}

impl Tier {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Tier::Ok => "OK",
            Tier::Caution => "CAUTION",
            Tier::Alert => "ALERT",
        }
    }
}

/// Whether an observation follows a real save or is just a re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    /// The profile was fetched because a save completed.
    SaveAttempt,
    /// Start-up fetch or manual refresh. Never counts as a failed save.
    Refresh,
}

/// Result of one observation, handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub tier: Tier,
    pub consecutive_no_progress: u32,
    pub display_snapshot: EditSnapshot,
}

impl Observation {
    /// Human-readable status line for this observation.
    pub fn message(&self) -> String {
        match self.consecutive_no_progress {
            0 => "Counts are increasing".to_string(),
            n => {
                let saves = if n == 1 { "save" } else { "saves" };
                match self.tier {
                    Tier::Alert => format!(
                        "{} consecutive {} without an increase. You may be throttled!",
                        n, saves
                    ),
                    Tier::Caution => format!(
                        "{} consecutive {} without an increase. (Are you throttled?)",
                        n, saves
                    ),
                    Tier::Ok => format!("{} consecutive {} without an increase", n, saves),
                }
            }
        }
    }
}

/// Mutable state of the throttle detector.
///
/// Created once per session and owned by whoever drives observations; it is
/// never persisted.
#[derive(Debug, Clone, Default)]
pub struct ThrottleState {
    last_snapshot: Option<EditSnapshot>,
    consecutive_no_progress: u32,
    thresholds: Thresholds,
}

impl ThrottleState {
    /// Fresh state with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            last_snapshot: None,
            consecutive_no_progress: 0,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn last_snapshot(&self) -> Option<&EditSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn consecutive_no_progress(&self) -> u32 {
        self.consecutive_no_progress
    }

    /// Current tier without observing anything new.
    pub fn tier(&self) -> Tier {
        self.thresholds.tier_for(self.consecutive_no_progress)
    }

    /// Record the snapshot fetched after a completed save.
    pub fn observe(&mut self, current: EditSnapshot) -> Observation {
        self.observe_as(current, ObservationKind::SaveAttempt)
    }

    /// Record a snapshot from a re-check that did not follow a save.
    ///
    /// A change still resets the run; an unchanged snapshot leaves it alone.
    pub fn observe_refresh(&mut self, current: EditSnapshot) -> Observation {
        self.observe_as(current, ObservationKind::Refresh)
    }

    /// Record a snapshot of the given kind.
    pub fn observe_as(&mut self, current: EditSnapshot, kind: ObservationKind) -> Observation {
        match &self.last_snapshot {
            None => self.consecutive_no_progress = 0,
            Some(last) if current.differs_from(last) => self.consecutive_no_progress = 0,
            Some(_) => {
                if kind == ObservationKind::SaveAttempt {
                    self.consecutive_no_progress = self.consecutive_no_progress.saturating_add(1);
                }
            }
        }

        self.last_snapshot = Some(current.clone());

        Observation {
            tier: self.tier(),
            consecutive_no_progress: self.consecutive_no_progress,
            display_snapshot: current,
        }
    }
}
