//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::monitor::Tier;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Badge background at the CAUTION tier.
    pub caution: Color,
    /// Badge background at the ALERT tier.
    pub alert: Color,
    /// Badge text color at the OK tier.
    pub ok: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the save reminder line.
    pub reminder: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            caution: Color::Yellow,
            alert: Color::Red,
            ok: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            reminder: Style::default().fg(Color::Yellow),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            caution: Color::Yellow,
            alert: Color::Red,
            ok: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            reminder: Style::default().fg(Color::Magenta),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Foreground style for text that reports a tier.
    pub fn tier_style(&self, tier: Tier) -> Style {
        match tier {
            Tier::Ok => Style::default().fg(self.ok),
            Tier::Caution => Style::default().fg(self.caution),
            Tier::Alert => Style::default().fg(self.alert).add_modifier(Modifier::BOLD),
        }
    }

    /// Border style for the badge: neutral when OK, tier colored otherwise.
    pub fn border_style(&self, tier: Tier) -> Style {
        match tier {
            Tier::Ok => Style::default().fg(self.border),
            Tier::Caution | Tier::Alert => self.tier_style(tier),
        }
    }

    /// Style for the count badge: plain when OK, filled otherwise.
    pub fn badge_style(&self, tier: Tier) -> Style {
        match tier {
            Tier::Ok => Style::default().fg(self.ok).add_modifier(Modifier::BOLD),
            Tier::Caution => Style::default()
                .fg(Color::Black)
                .bg(self.caution)
                .add_modifier(Modifier::BOLD),
            Tier::Alert => Style::default()
                .fg(Color::White)
                .bg(self.alert)
                .add_modifier(Modifier::BOLD),
        }
    }
}
