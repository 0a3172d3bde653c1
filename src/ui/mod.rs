//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`badge`]: Total count, category counts and the throttle warning
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Badge (badge::render)                │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod badge;
pub mod common;
pub mod theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub use theme::Theme;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(8),    // Badge
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    badge::render(frame, app, chunks[1]);
    common::render_status_bar(frame, app, chunks[2]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::MonitorError;
    use crate::monitor::{EditSnapshot, ObservationKind};
    use crate::profile::{FetchResult, FetchWorker, ProfileProvider};
    use crate::source::ChannelEvents;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, buffer::Buffer, style::Color, Terminal};
    use std::sync::Arc;

    #[derive(Debug)]
    struct NeverProvider;

    #[async_trait]
    impl ProfileProvider for NeverProvider {
        async fn fetch(&self, _user: &str) -> Result<EditSnapshot, MonitorError> {
            Err(MonitorError::unavailable("offline"))
        }

        fn description(&self) -> String {
            "never".to_string()
        }
    }

    fn app() -> App {
        let worker = FetchWorker::spawn(Arc::new(NeverProvider), "Tester");
        let (_tx, events) = ChannelEvents::create("test");
        App::new("Tester", Box::new(events), worker, &Settings::default())
    }

    fn render_buffer(app: &App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        render_buffer(app, width, height)
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[tokio::test]
    async fn test_badge_shows_counts_and_warning() {
        let mut app = app();
        let snapshot = EditSnapshot::new(1234).with_category("mapUpdateRequest", 7u64);
        app.apply_fetch(FetchResult {
            kind: ObservationKind::Refresh,
            result: Ok(snapshot.clone()),
        });
        for _ in 0..5 {
            app.apply_fetch(FetchResult {
                kind: ObservationKind::SaveAttempt,
                result: Ok(snapshot.clone()),
            });
        }

        let screen = render(&app, 80, 20);
        assert!(screen.contains("1234"));
        assert!(screen.contains("URs closed"));
        assert!(screen.contains("Are you throttled?"));
    }

    #[tokio::test]
    async fn test_badge_border_follows_tier() {
        let mut app = app();
        let snapshot = EditSnapshot::new(10);
        app.apply_fetch(FetchResult {
            kind: ObservationKind::Refresh,
            result: Ok(snapshot.clone()),
        });

        // The badge block starts on the row below the header.
        let buffer = render_buffer(&app, 80, 20);
        assert_eq!(buffer.cell((0, 1)).unwrap().fg, app.theme.border);

        for _ in 0..10 {
            app.apply_fetch(FetchResult {
                kind: ObservationKind::SaveAttempt,
                result: Ok(snapshot.clone()),
            });
        }
        let buffer = render_buffer(&app, 80, 20);
        assert_eq!(buffer.cell((0, 1)).unwrap().fg, Color::Red);
    }

    #[tokio::test]
    async fn test_small_terminal_message() {
        let app = app();
        let screen = render(&app, 30, 8);
        assert!(screen.contains("Terminal too small"));
    }
}
