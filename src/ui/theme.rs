//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and the focused selector.
    pub highlight: Color,
    /// Color for notices and errors.
    pub error: Color,
    /// Color for borders and axes.
    pub border: Color,
    /// Line colors, assigned to series in order.
    pub series: Vec<Color>,
    /// Style for the zoom drag band.
    pub selection: Style,
    /// Style for the focused selector.
    pub focused: Style,
    /// Style for unfocused selectors.
    pub unfocused: Style,
    pub title: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            border: Color::Gray,
            series: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Green,
                Color::LightRed,
                Color::LightBlue,
            ],
            selection: Style::default().bg(Color::DarkGray),
            focused: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            unfocused: Style::default().fg(Color::Gray),
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            border: Color::DarkGray,
            series: vec![
                Color::Blue,
                Color::Red,
                Color::Magenta,
                Color::Green,
                Color::DarkGray,
                Color::Cyan,
            ],
            selection: Style::default().bg(Color::LightBlue),
            focused: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            unfocused: Style::default().fg(Color::DarkGray),
            title: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Line color for the `index`th series.
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return self.highlight;
        }
        self.series[index % self.series.len()]
    }
}
