//! Common UI components: header bar, status bar and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar.
///
/// Displays: tier indicator, user, save counters and the provider in use.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tier = app.tier();
    let saving = if app.saving {
        Span::styled(" saving… ", Style::default().fg(app.theme.highlight))
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.tier_style(tier)),
        Span::styled("EDIT COUNT MONITOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(app.user().to_string(), app.theme.header),
        Span::raw(" │ "),
        Span::raw(format!("{} saves", app.saves_completed)),
        if app.saves_failed > 0 {
            Span::styled(
                format!(" ({} failed)", app.saves_failed),
                Style::default().fg(app.theme.caution),
            )
        } else {
            Span::raw("")
        },
        Span::raw(format!(" │ {} pending", app.pending_changes)),
        saving,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary messages first, then errors, then the time since the
/// last observation and the available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "r:refresh e:export ?:help q:quit";
    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | {}", err, controls)
    } else if let Some(err) = app.source_error() {
        format!(" {}: {} | {}", app.source_description(), err, controls)
    } else if let Some(updated) = app.last_updated {
        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
            controls
        )
    } else {
        format!(" Loading {}... | q:quit", app.provider_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let thresholds = app.throttle.thresholds();
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  r         Re-check profile (not counted as a save)"),
        Line::from("  e         Export to JSON"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Warning tiers",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled("  CAUTION ", app.theme.tier_style(crate::monitor::Tier::Caution)),
            Span::raw(format!(" {}+ saves without an increase", thresholds.caution)),
        ]),
        Line::from(vec![
            Span::styled("  ALERT   ", app.theme.tier_style(crate::monitor::Tier::Alert)),
            Span::raw(format!(" {}+ saves without an increase", thresholds.alert)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 52u16.min(area.width.saturating_sub(4));
    let help_height = 16u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
