//! # edit-count-monitor
//!
//! A terminal monitor that warns a map editor when their saves stop being
//! counted on their public editor profile.
//!
//! After every completed save the monitor re-reads the editor's profile and
//! compares the edit counts with the previous reading. Saves that leave every
//! count unchanged suggest the editor is being throttled; after enough of them
//! in a row the badge escalates from OK to CAUTION to ALERT.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ monitor  │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(throttle)│    │(render) │    │         │ │
//! │  └──┬───┬──┘    └──────────┘    └─────────┘    └─────────┘ │
//! │     │   │                                                   │
//! │     │   ▼                                                   │
//! │     │  ┌─────────┐                                          │
//! │     │  │ profile │◀── HttpProfileProvider | FileProfileProvider
//! │     │  │ (fetch) │                                          │
//! │     │  └─────────┘                                          │
//! │     ▼                                                       │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── StreamEvents | ChannelEvents | PollingSaveSource
//! │  │ (host)  │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state; routes host events and applies fetch results
//! - **[`monitor`]**: Throttle detection ([`ThrottleState`]), save reminder and
//!   session log
//! - **[`profile`]**: Profile payload parsing and the [`ProfileProvider`] capability
//! - **[`source`]**: Host event sources ([`SaveEventSource`] trait)
//! - **[`config`]**: Layered [`Settings`]
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Listen for save events from the host on a TCP connection
//! edit-count-monitor --user MapOMatic --connect localhost:7878
//!
//! # Poll a status file the host keeps up to date
//! edit-count-monitor --user MapOMatic --status-file status.json
//!
//! # Check once and print a JSON report
//! edit-count-monitor --user MapOMatic --once
//! ```
//!
//! ### Observing snapshots directly
//!
//! ```
//! use edit_count_monitor::{EditSnapshot, ThrottleState, Tier};
//!
//! let mut state = ThrottleState::default();
//! let first = state.observe(EditSnapshot::new(100));
//! assert_eq!(first.tier, Tier::Ok);
//!
//! for _ in 0..5 {
//!     state.observe(EditSnapshot::new(100));
//! }
//! assert_eq!(state.tier(), Tier::Caution);
//! ```
//!
//! ### As a library with a stream source (TCP, etc.)
//!
//! ```no_run
//! use std::sync::Arc;
//! use edit_count_monitor::{
//!     App, FetchWorker, FileProfileProvider, Settings, StreamEvents,
//! };
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let provider = FileProfileProvider::new("profile.html", settings.profile.mapping());
//! let worker = FetchWorker::spawn(Arc::new(provider), "MapOMatic");
//!
//! let stream = std::io::Cursor::new(b"{\"event\":\"save_started\"}\n".to_vec());
//! let events = StreamEvents::spawn(stream, "example");
//! let mut app = App::new("MapOMatic", Box::new(events), worker, &settings);
//! app.start();
//! # });
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod profile;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use error::MonitorError;
pub use monitor::{
    CategoryCount, EditSnapshot, Observation, ObservationKind, ReminderAction, SaveReminder,
    SessionLog, SessionLogEntry, ThrottleState, Thresholds, Tier, TrackedCategory,
};
pub use profile::{
    CountSource, FetchResult, FetchWorker, FileProfileProvider, HttpProfileProvider,
    ProfileFormat, ProfilePayload, ProfileProvider,
};
pub use source::{
    ChannelEvents, HostEvent, HostStatus, PollingSaveSource, SaveEventSource, SaveStatusProbe,
    StatusFileProbe, StreamEvents,
};
