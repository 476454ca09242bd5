//! Color theme for the TUI - using ANSI colors for better terminal compatibility

use ratatui::style::{Color, Modifier, Style};

use crate::analytics::TrendDirection;
use crate::tracking::EventKind;

/// Theme using ANSI colors that work well across terminal themes
pub struct Theme;

impl Theme {
    pub const CYAN: Color = Color::Cyan;
    pub const GREEN: Color = Color::Green;
    pub const YELLOW: Color = Color::Yellow;
    pub const RED: Color = Color::Red;
    pub const BLUE: Color = Color::Blue;
    pub const DARK_GRAY: Color = Color::DarkGray;

    pub fn title() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default()
    }

    pub fn bold() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::GREEN)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::RED)
    }

    pub fn accent() -> Style {
        Style::default().fg(Self::CYAN)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    /// Series color of a tracking kind
    pub fn kind_color(kind: EventKind) -> Color {
        match kind {
            EventKind::PainAssessment => Self::RED,
            EventKind::SleepQuality => Self::BLUE,
            EventKind::MoodAssessment => Self::GREEN,
        }
    }

    pub fn kind(kind: EventKind) -> Style {
        Style::default().fg(Self::kind_color(kind))
    }

    pub fn trend(direction: TrendDirection) -> Style {
        match direction {
            TrendDirection::Improving => Self::success(),
            TrendDirection::Worsening => Self::error(),
            TrendDirection::Unchanged | TrendDirection::NoTrend => Self::muted(),
        }
    }

    // Badge styles
    pub fn new_badge() -> Style {
        Style::default()
            .bg(Self::YELLOW)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_tab() -> Style {
        Style::default()
            .bg(Self::CYAN)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    // Key hints
    pub fn key() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_desc() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }
}
