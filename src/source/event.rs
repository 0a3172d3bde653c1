//! Messages exchanged with the host editor.
//!
//! Events travel as newline-delimited JSON, tagged by `"event"`:
//!
//! ```text
//! {"event":"save_started"}
//! {"event":"save_completed","success":true}
//! {"event":"actions_changed","pending":112}
//! {"event":"session_summary","duration_seconds":3600.0,"distance_km":18.2}
//! ```

use serde::{Deserialize, Serialize};

/// A lifecycle notification from the host editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// The user started saving.
    SaveStarted,
    /// A save finished. Only successful saves lead to an observation.
    SaveCompleted {
        #[serde(default = "default_success")]
        success: bool,
    },
    /// Number of objects with unsaved changes (inserted, updated or deleted).
    ActionsChanged { pending: u32 },
    /// The host closed an editing session.
    SessionSummary {
        duration_seconds: f64,
        #[serde(default)]
        distance_km: f64,
    },
}

fn default_success() -> bool {
    true
}

/// Point-in-time status of the host, read by polling adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    /// True while a save is in progress.
    pub saving: bool,
    /// Number of objects with unsaved changes.
    #[serde(default)]
    pub pending: u32,
    /// True if the most recent save was rejected.
    #[serde(default)]
    pub save_failed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_events() {
        let e: HostEvent = serde_json::from_str(r#"{"event":"save_started"}"#).unwrap();
        assert_eq!(e, HostEvent::SaveStarted);

        let e: HostEvent =
            serde_json::from_str(r#"{"event":"save_completed","success":false}"#).unwrap();
        assert_eq!(e, HostEvent::SaveCompleted { success: false });

        let e: HostEvent = serde_json::from_str(r#"{"event":"save_completed"}"#).unwrap();
        assert_eq!(e, HostEvent::SaveCompleted { success: true });

        let e: HostEvent =
            serde_json::from_str(r#"{"event":"actions_changed","pending":12}"#).unwrap();
        assert_eq!(e, HostEvent::ActionsChanged { pending: 12 });

        let e: HostEvent = serde_json::from_str(
            r#"{"event":"session_summary","duration_seconds":90.5,"distance_km":2.25}"#,
        )
        .unwrap();
        assert_eq!(
            e,
            HostEvent::SessionSummary {
                duration_seconds: 90.5,
                distance_km: 2.25
            }
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<HostEvent>(r#"{"event":"zoom"}"#).is_err());
    }

    #[test]
    fn test_host_status_defaults() {
        let s: HostStatus = serde_json::from_str(r#"{"saving":true}"#).unwrap();
        assert!(s.saving);
        assert_eq!(s.pending, 0);
        assert!(!s.save_failed);
    }
}
