//! Terminal rendering.
//!
//! - [`chart`]: the time-series plot and its axes
//! - [`common`]: selector bar, status bar and help overlay
//! - [`theme`]: light/dark colors

pub mod chart;
pub mod common;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for usable display
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw the whole dashboard.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(
            0,
            (area.height / 2).saturating_sub(2),
            area.width,
            5.min(area.height),
        );
        frame.render_widget(paragraph, centered);
        app.plot_area = None;
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Selectors
        Constraint::Min(8),    // Chart
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_selectors(frame, app, chunks[1]);
    chart::render(frame, app, chunks[2]);
    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
