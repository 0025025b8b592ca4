//! Common UI components.
//!
//! This module contains the header bar, selector bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Selector};

/// Render the header bar.
///
/// Displays: store, pending calls, last successful update.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (icon, icon_style) = if app.last_error.is_some() {
        ("●", Style::default().fg(app.theme.error))
    } else {
        ("●", Style::default().fg(app.theme.highlight))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", icon), icon_style),
        Span::styled("INSTRUMENT ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.source_description().to_string()),
    ];
    if app.in_flight() > 0 {
        spans.push(Span::raw(format!(" │ {} pending", app.in_flight())));
    }
    if let Some(at) = app.last_update {
        spans.push(Span::raw(format!(
            " │ updated {:.0}s ago",
            at.elapsed().as_secs_f64()
        )));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the selector bar.
///
/// The focused selector is highlighted; ←/→ changes it.
pub fn render_selectors(frame: &mut Frame, app: &App, area: Rect) {
    let cascade = app.view.cascade();
    let mut spans = Vec::new();

    for selector in Selector::ALL {
        let value = match selector {
            Selector::Metric => cascade
                .metric
                .current()
                .map(short_metric)
                .unwrap_or("-")
                .to_string(),
            Selector::Host => cascade.host.current().unwrap_or("-").to_string(),
            Selector::Interface => cascade.interface.current().unwrap_or("-").to_string(),
            Selector::Transform => app.view.transform().to_string(),
            Selector::Window => match &app.window_input {
                Some(input) => format!("{}▏", input),
                None => app.view.window_label(),
            },
        };
        let style = if selector == app.focus {
            app.theme.focused
        } else {
            app.theme.unfocused
        };
        spans.push(Span::styled(
            format!(" {}: {} ", selector.label(), value),
            style,
        ));
        spans.push(Span::raw("│"));
    }
    spans.pop();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Last path segment of a metric name.
fn short_metric(metric: &str) -> &str {
    metric.rsplit('/').next().unwrap_or(metric)
}

/// Render the status bar at the bottom.
///
/// Shows temporary status messages first, then the last error, then controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if app.window_input.is_some() {
        " Window (e.g. 30m, 6h, 2d, 1w) | Enter:apply Esc:cancel".to_string()
    } else {
        let next = match app.refetch_in() {
            Some(d) => format!("next fetch {}s", d.as_secs()),
            None => "idle".to_string(),
        };
        let zoom = app.view.zoom();
        let zoom = if zoom.is_zoomed() {
            format!(" | zoom depth {}", zoom.depth())
        } else {
            String::new()
        };
        let error = match &app.last_error {
            Some(err) => format!(" | Error: {}", err),
            None => String::new(),
        };
        format!(
            " {}{}{} | Tab:focus ←→:change <>:window w:type drag:zoom z:unzoom ?:help q:quit",
            next, zoom, error
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the chart.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.title)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Selectors",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/S-Tab   Focus next/previous"),
        Line::from("  ←/→ h/l     Change focused value"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Time window",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  < / >       Halve / double"),
        Line::from("  w           Type a window (6h, 2d)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Zoom",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  drag        Zoom to range"),
        Line::from("  z / Esc     Zoom out"),
        Line::from("  right-click Zoom out"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r           Fetch now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
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

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
