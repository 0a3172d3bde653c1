//! Count badge rendering.
//!
//! The badge shows the latest total edit count, the tracked category counts
//! and the throttle warning. Its colors follow the current [`Tier`].

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;
use crate::monitor::{CategoryCount, Tier};

/// Render the badge into the content area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tier = app.tier();
    let block = Block::default()
        .title(format!(" {} ", tier.symbol()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border_style(tier));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(ref observation) = app.last_observation else {
        let text = match app.load_error {
            Some(ref err) => format!("Edit counts unavailable: {}", err),
            None => "Waiting for profile...".to_string(),
        };
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        return;
    };

    let rows = app.categories.len() as u16;
    let chunks = Layout::vertical([
        Constraint::Length(3),        // Count
        Constraint::Length(rows + 1), // Categories
        Constraint::Min(2),           // Messages
    ])
    .split(inner);

    let count = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}  ", observation.display_snapshot.total_count),
            app.theme.badge_style(tier),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(count, chunks[0]);

    let table_rows: Vec<Row> = app
        .categories
        .iter()
        .map(|c| {
            let count = observation
                .display_snapshot
                .category(&c.key)
                .unwrap_or(CategoryCount::Unknown);
            Row::new(vec![Cell::from(c.label.clone()), Cell::from(count.to_string())])
        })
        .collect();
    let table = Table::new(table_rows, [Constraint::Min(20), Constraint::Length(10)])
        .header(Row::new(vec!["Category", "Count"]).style(app.theme.header));
    frame.render_widget(table, chunks[1]);

    let mut lines = Vec::new();
    if tier != Tier::Ok || observation.consecutive_no_progress > 0 {
        lines.push(Line::from(Span::styled(
            observation.message(),
            app.theme.tier_style(tier),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            observation.message(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    if let Some(ref reminder) = app.reminder_message {
        lines.push(Line::from(Span::styled(reminder.clone(), app.theme.reminder)));
    }
    if app.load_error.is_some() {
        lines.push(Line::from(Span::styled(
            "Last check failed; showing previous counts",
            Style::default().fg(app.theme.caution),
        )));
    }

    let messages = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(messages, chunks[2]);
}
