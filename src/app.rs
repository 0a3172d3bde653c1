//! Application state and event routing.
//!
//! `App` owns the [`ThrottleState`] and is the only place it is mutated.
//! Host events come in through a [`SaveEventSource`]; profile fetches go out
//! through the [`FetchWorker`] and come back as results that are applied on
//! the next [`App::tick`].

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::monitor::{
    Observation, ObservationKind, ReminderAction, SaveReminder, SessionLog, SessionLogEntry,
    ThrottleState, Tier, TrackedCategory,
};
use crate::profile::{FetchResult, FetchWorker};
use crate::source::{HostEvent, SaveEventSource};
use crate::ui::Theme;

/// How long temporary status messages stay visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Collaborators
    user: String,
    events: Box<dyn SaveEventSource>,
    worker: FetchWorker,

    // Monitor state
    pub throttle: ThrottleState,
    pub reminder: SaveReminder,
    pub categories: Vec<TrackedCategory>,
    pub last_observation: Option<Observation>,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,
    pub session_log: Option<SessionLog>,

    // Host state as last reported
    pub saving: bool,
    pub pending_changes: u32,
    pub saves_completed: u32,
    pub saves_failed: u32,

    // Reminder currently shown, if any
    pub reminder_message: Option<String>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App from its collaborators and settings.
    pub fn new(
        user: &str,
        events: Box<dyn SaveEventSource>,
        worker: FetchWorker,
        settings: &Settings,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            user: user.to_string(),
            events,
            worker,
            throttle: ThrottleState::new(settings.thresholds),
            reminder: SaveReminder::new(settings.reminder),
            categories: settings.profile.categories.clone(),
            last_observation: None,
            last_updated: None,
            load_error: None,
            session_log: None,
            saving: false,
            pending_changes: 0,
            saves_completed: 0,
            saves_failed: 0,
            reminder_message: None,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Replace the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Attach a session log that receives session summaries.
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session_log = Some(log);
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Description of the event source.
    pub fn source_description(&self) -> &str {
        self.events.description()
    }

    /// Description of the profile provider.
    pub fn provider_description(&self) -> &str {
        self.worker.description()
    }

    /// Error reported by the event source, if any.
    pub fn source_error(&self) -> Option<String> {
        self.events.error()
    }

    /// Current tier, OK before the first observation.
    pub fn tier(&self) -> Tier {
        self.throttle.tier()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Kick off the initial profile fetch.
    pub fn start(&mut self) {
        info!("Watching edit counts for {}", self.user);
        self.request_fetch(ObservationKind::Refresh);
    }

    /// Re-check the profile without counting it as a save.
    pub fn refresh(&mut self) {
        self.request_fetch(ObservationKind::Refresh);
        self.set_status_message("Refreshing profile...".to_string());
    }

    fn request_fetch(&mut self, kind: ObservationKind) {
        if !self.worker.request(kind) {
            warn!("Profile fetch worker has stopped");
            self.load_error = Some("Profile fetch worker has stopped".to_string());
        }
    }

    /// Drain pending host events and finished fetches.
    ///
    /// Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        while let Some(event) = self.events.poll() {
            self.handle_host_event(event);
            changed = true;
        }

        while let Some(result) = self.worker.try_result() {
            self.apply_fetch(result);
            changed = true;
        }

        changed
    }

    /// React to one host event.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        debug!("Host event: {:?}", event);
        match event {
            HostEvent::SaveStarted => {
                self.saving = true;
            }
            HostEvent::SaveCompleted { success: true } => {
                self.saving = false;
                self.saves_completed += 1;
                self.reminder.reset();
                self.reminder_message = None;
                self.request_fetch(ObservationKind::SaveAttempt);
            }
            HostEvent::SaveCompleted { success: false } => {
                // A rejected save says nothing about throttling.
                self.saving = false;
                self.saves_failed += 1;
                warn!("Save failed; edit counts not checked");
                self.set_status_message("Save failed; counts not checked".to_string());
            }
            HostEvent::ActionsChanged { pending } => {
                self.pending_changes = pending;
                match self.reminder.update(pending) {
                    ReminderAction::None => {}
                    ReminderAction::Clear => self.reminder_message = None,
                    action => {
                        if let Some(message) = action.message() {
                            info!("{}", message);
                            self.reminder_message = Some(message);
                        }
                    }
                }
            }
            HostEvent::SessionSummary {
                duration_seconds,
                distance_km,
            } => self.record_session(duration_seconds, distance_km),
        }
    }

    fn record_session(&mut self, duration_seconds: f64, distance_km: f64) {
        let Some(log) = self.session_log.as_mut() else {
            debug!("No session log configured; dropping session summary");
            return;
        };
        log.append(SessionLogEntry::now(duration_seconds, distance_km));
        if let Err(e) = log.save() {
            warn!("Failed to save session log: {:#}", e);
        }
    }

    /// Apply a finished fetch to the throttle state.
    ///
    /// A failed fetch only updates the error display; the no-progress run
    /// and the last snapshot are left exactly as they were.
    pub fn apply_fetch(&mut self, fetch: FetchResult) {
        match fetch.result {
            Ok(snapshot) => {
                let previous_tier = self.throttle.tier();
                let observation = self.throttle.observe_as(snapshot, fetch.kind);

                if observation.tier != previous_tier {
                    match observation.tier {
                        Tier::Ok => info!("Edit counts increasing again"),
                        Tier::Caution | Tier::Alert => warn!("{}", observation.message()),
                    }
                }
                debug!(
                    "Observed total {} ({} without increase)",
                    observation.display_snapshot.total_count,
                    observation.consecutive_no_progress
                );

                self.last_observation = Some(observation);
                self.last_updated = Some(Instant::now());
                self.load_error = None;
            }
            Err(e) => {
                warn!("Skipping observation: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Build the JSON report used by export and `--once`.
    pub fn report(&self) -> serde_json::Value {
        let categories: Vec<serde_json::Value> = self
            .categories
            .iter()
            .map(|c| {
                let count = self
                    .last_observation
                    .as_ref()
                    .and_then(|o| o.display_snapshot.category(&c.key))
                    .and_then(|count| count.value());
                serde_json::json!({
                    "key": c.key,
                    "label": c.label,
                    "count": count,
                })
            })
            .collect();

        serde_json::json!({
            "user": self.user,
            "tier": self.tier(),
            "consecutive_no_progress": self.throttle.consecutive_no_progress(),
            "message": self.last_observation.as_ref().map(|o| o.message()),
            "total_count": self.last_observation.as_ref().map(|o| o.display_snapshot.total_count),
            "categories": categories,
            "pending_changes": self.pending_changes,
            "saves_completed": self.saves_completed,
            "saves_failed": self.saves_failed,
            "error": self.load_error,
        })
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.last_observation.is_none() {
            anyhow::bail!("No data to export");
        }
        let json = serde_json::to_string_pretty(&self.report())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Wait for the next fetch result and apply it.
    ///
    /// Used by the headless mode, which has no event loop.
    pub async fn wait_for_fetch(&mut self) -> bool {
        match self.worker.next_result().await {
            Some(result) => {
                self.apply_fetch(result);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use crate::monitor::EditSnapshot;
    use crate::profile::ProfileProvider;
    use crate::source::ChannelEvents;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::UnboundedSender;

    /// Provider that hands out queued results, one per fetch.
    #[derive(Debug, Default)]
    struct QueueProvider {
        results: Mutex<VecDeque<Result<EditSnapshot, MonitorError>>>,
    }

    impl QueueProvider {
        fn push(&self, result: Result<EditSnapshot, MonitorError>) {
            self.results.lock().unwrap().push_back(result);
        }
    }

    #[async_trait]
    impl ProfileProvider for QueueProvider {
        async fn fetch(&self, _user: &str) -> Result<EditSnapshot, MonitorError> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(MonitorError::unavailable("no result queued")))
        }

        fn description(&self) -> String {
            "queue".to_string()
        }
    }

    fn snap(total: u64) -> EditSnapshot {
        EditSnapshot::new(total).with_category("mapUpdateRequest", 1u64)
    }

    fn setup() -> (App, UnboundedSender<HostEvent>, Arc<QueueProvider>) {
        let provider = Arc::new(QueueProvider::default());
        let worker = FetchWorker::spawn(provider.clone(), "Tester");
        let (tx, events) = ChannelEvents::create("test");
        let app = App::new("Tester", Box::new(events), worker, &Settings::default());
        (app, tx, provider)
    }

    /// Tick until a fetch result has been applied.
    async fn settle(app: &mut App) {
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if let Some(result) = app.worker.try_result() {
                app.apply_fetch(result);
                return;
            }
        }
        panic!("no fetch result arrived");
    }

    async fn save(app: &mut App, tx: &UnboundedSender<HostEvent>) {
        tx.send(HostEvent::SaveStarted).unwrap();
        tx.send(HostEvent::SaveCompleted { success: true }).unwrap();
        // Process events only; the fetch result is applied by settle.
        while let Some(event) = app.events.poll() {
            app.handle_host_event(event);
        }
        settle(app).await;
    }

    #[tokio::test]
    async fn test_start_performs_refresh_observation() {
        let (mut app, _tx, provider) = setup();
        provider.push(Ok(snap(10)));
        app.start();
        settle(&mut app).await;

        let obs = app.last_observation.as_ref().unwrap();
        assert_eq!(obs.tier, Tier::Ok);
        assert_eq!(obs.consecutive_no_progress, 0);
        assert_eq!(obs.display_snapshot.total_count, 10);
        assert!(app.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_saves_without_increase_escalate() {
        let (mut app, tx, provider) = setup();
        provider.push(Ok(snap(10)));
        app.start();
        settle(&mut app).await;

        for expected in 1..=5 {
            provider.push(Ok(snap(10)));
            save(&mut app, &tx).await;
            assert_eq!(app.throttle.consecutive_no_progress(), expected);
        }
        assert_eq!(app.tier(), Tier::Caution);
        assert_eq!(app.saves_completed, 5);

        provider.push(Ok(snap(11)));
        save(&mut app, &tx).await;
        assert_eq!(app.throttle.consecutive_no_progress(), 0);
        assert_eq!(app.tier(), Tier::Ok);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_touch_state() {
        let (mut app, tx, provider) = setup();
        provider.push(Ok(snap(10)));
        app.start();
        settle(&mut app).await;

        provider.push(Ok(snap(10)));
        save(&mut app, &tx).await;
        assert_eq!(app.throttle.consecutive_no_progress(), 1);

        provider.push(Err(MonitorError::unavailable("HTTP 500")));
        save(&mut app, &tx).await;
        assert_eq!(app.throttle.consecutive_no_progress(), 1);
        assert_eq!(app.throttle.last_snapshot(), Some(&snap(10)));
        assert!(app.load_error.as_ref().unwrap().contains("HTTP 500"));

        provider.push(Ok(snap(10)));
        save(&mut app, &tx).await;
        assert_eq!(app.throttle.consecutive_no_progress(), 2);
        assert!(app.load_error.is_none());
    }

    #[tokio::test]
    async fn test_failed_save_does_not_fetch() {
        let (mut app, tx, provider) = setup();
        provider.push(Ok(snap(10)));
        app.start();
        settle(&mut app).await;

        tx.send(HostEvent::SaveCompleted { success: false }).unwrap();
        assert!(app.tick());
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.tick();

        assert_eq!(app.saves_failed, 1);
        assert_eq!(app.throttle.consecutive_no_progress(), 0);
        // No fetch ran, so the empty provider never reported an error.
        assert!(app.load_error.is_none());
        assert!(app.get_status_message().unwrap().contains("Save failed"));
    }

    #[tokio::test]
    async fn test_refresh_does_not_count_as_save() {
        let (mut app, _tx, provider) = setup();
        provider.push(Ok(snap(10)));
        app.start();
        settle(&mut app).await;

        provider.push(Ok(snap(10)));
        app.refresh();
        settle(&mut app).await;
        assert_eq!(app.throttle.consecutive_no_progress(), 0);
    }

    #[tokio::test]
    async fn test_reminder_messages_follow_pending_changes() {
        let (mut app, tx, provider) = setup();

        tx.send(HostEvent::ActionsChanged { pending: 120 }).unwrap();
        app.tick();
        assert!(app.reminder_message.as_ref().unwrap().contains("100 objects"));

        tx.send(HostEvent::ActionsChanged { pending: 151 }).unwrap();
        app.tick();
        assert!(app.reminder_message.as_ref().unwrap().contains("150 objects"));
        assert_eq!(app.pending_changes, 151);

        provider.push(Ok(snap(1)));
        tx.send(HostEvent::SaveCompleted { success: true }).unwrap();
        app.tick();
        assert!(app.reminder_message.is_none());
        assert!(!app.reminder.is_active());
    }

    #[tokio::test]
    async fn test_session_summary_is_logged() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        let (app, tx, _provider) = setup();
        let mut app = app.with_session_log(SessionLog::load(&path).unwrap());

        tx.send(HostEvent::SessionSummary {
            duration_seconds: 1800.0,
            distance_km: 4.5,
        })
        .unwrap();
        app.tick();

        let reloaded = SessionLog::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.latest().unwrap().distance_km, 4.5);
    }

    #[tokio::test]
    async fn test_export_and_report() {
        let (mut app, _tx, provider) = setup();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.json");

        assert!(app.export_state(&path).is_err());

        provider.push(Ok(snap(42)));
        app.start();
        settle(&mut app).await;

        app.export_state(&path).unwrap();
        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["user"], "Tester");
        assert_eq!(exported["tier"], "OK");
        assert_eq!(exported["total_count"], 42);
        assert_eq!(exported["categories"][0]["key"], "mapUpdateRequest");
        assert_eq!(exported["categories"][0]["count"], 1);
        // machineMapProblem was not in the snapshot
        assert!(exported["categories"][1]["count"].is_null());
    }

    #[tokio::test]
    async fn test_wait_for_fetch() {
        let (mut app, _tx, provider) = setup();
        provider.push(Ok(snap(3)));
        app.start();
        assert!(app.wait_for_fetch().await);
        assert_eq!(
            app.last_observation.unwrap().display_snapshot.total_count,
            3
        );
    }
}
