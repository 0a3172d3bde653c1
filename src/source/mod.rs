//! Host event sources.
//!
//! This module provides a trait-based abstraction for learning when the host
//! editor completes a save. Hosts that push events are read through
//! [`StreamEvents`] or [`ChannelEvents`]; hosts that only expose their
//! current state are wrapped in a [`PollingSaveSource`], which turns the
//! "was saving, no longer saving" edge into the same events.

mod channel;
mod event;
mod poll;
mod stream;

pub use channel::ChannelEvents;
pub use event::{HostEvent, HostStatus};
pub use poll::{PollingSaveSource, SaveStatusProbe, StatusFileProbe, DEFAULT_POLL_INTERVAL};
pub use stream::StreamEvents;

use std::fmt::Debug;

/// Trait for receiving host events from various sources.
///
/// # Example
///
/// ```
/// use edit_count_monitor::{ChannelEvents, HostEvent, SaveEventSource};
///
/// let (tx, mut source) = ChannelEvents::create("embedded");
/// tx.send(HostEvent::SaveCompleted { success: true }).unwrap();
/// assert_eq!(source.poll(), Some(HostEvent::SaveCompleted { success: true }));
/// ```
pub trait SaveEventSource: Send + Debug {
    /// Take the next pending event.
    ///
    /// Returns `Some(event)` if one is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<HostEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The last error the source ran into, if it has not recovered since.
    fn error(&self) -> Option<String>;
}
