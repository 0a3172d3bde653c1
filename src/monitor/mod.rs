//! Core monitoring logic, independent of any host or rendering surface.
//!
//! ## Submodules
//!
//! - [`snapshot`]: Edit counts read from a profile ([`EditSnapshot`])
//! - [`throttle`]: Consecutive no-progress detection ([`ThrottleState`], [`Tier`])
//! - [`reminder`]: Reminder to save when many objects are pending ([`SaveReminder`])
//! - [`session_log`]: Capped on-disk log of editing sessions ([`SessionLog`])
//!
//! ## Data Flow
//!
//! ```text
//! save completed ──▶ profile fetch ──▶ EditSnapshot
//!                                          │
//!                                          ▼
//!                               ThrottleState::observe()
//!                                          │
//!                                          ▼
//!                         Observation { tier, count, snapshot }
//! ```

pub mod reminder;
pub mod session_log;
pub mod snapshot;
pub mod throttle;

pub use reminder::{ReminderAction, ReminderThresholds, SaveReminder};
pub use session_log::{SessionLog, SessionLogEntry, MAX_SESSION_LOG_SIZE};
pub use snapshot::{CategoryCount, EditSnapshot, TrackedCategory};
pub use throttle::{Observation, ObservationKind, ThrottleState, Thresholds, Tier};
