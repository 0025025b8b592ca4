//! Time-series chart.
//!
//! ```text
//! ┌─ /network/interface/stats/ifInOctets · gw · eth0 ───────────────────┐
//! │ 1.2Mbps┤        ⢀⡠⠤⠒⠉⠉⠒⠢⢄                                          │
//! │        │  ⣀⡠⠔⠊⠁          ⠑⠤⣀⣀⣀                                     │
//! │   0bps ┼────────────────────────────                               │
//! │        08:00        12:00        16:00                             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{format_bps, AxisRange};

const DAY_MS: f64 = 86_400_000.0;

/// Render the chart and remember where its plot landed.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(title(app), app.theme.title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let bounds = app.view.x_bounds();
    let (Some(bounds), false) = (bounds, app.view.series().is_empty()) else {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let message = if app.view.cascade().complete().is_none() {
            "  Waiting for selectors…"
        } else {
            "  Waiting for data…"
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(app.theme.border)),
            inner,
        );
        app.plot_area = None;
        return;
    };

    let visible: Vec<Vec<(f64, f64)>> = app
        .view
        .series()
        .iter()
        .map(|s| {
            s.data
                .iter()
                .copied()
                .filter(|(t, _)| *t >= bounds.min && *t <= bounds.max)
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = app
        .view
        .series()
        .iter()
        .zip(&visible)
        .enumerate()
        .map(|(i, (series, data))| {
            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(data)
        })
        .collect();

    let y_max = app.view.y_max() * 1.1;
    let axis_style = Style::default().fg(app.theme.border);
    let y_labels: Vec<Span> = [0.0, y_max / 2.0, y_max]
        .iter()
        .map(|v| Span::styled(format_bps(*v), axis_style))
        .collect();
    let x_labels: Vec<Span> = time_labels(bounds)
        .into_iter()
        .map(|l| Span::styled(l, axis_style))
        .collect();

    let y_label_width = y_labels.iter().map(|s| s.width()).max().unwrap_or(0) as u16;
    let inner = block.inner(area);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([bounds.min, bounds.max])
                .labels(x_labels)
                .style(axis_style),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(y_labels)
                .style(axis_style),
        );
    frame.render_widget(chart, area);

    // Y labels plus the axis line on the left, x labels plus the axis line below
    let plot = Rect {
        x: inner.x + y_label_width + 1,
        y: inner.y,
        width: inner.width.saturating_sub(y_label_width + 1),
        height: inner.height.saturating_sub(2),
    };
    app.plot_area = Some(plot);

    if let Some(drag) = app.drag {
        let left = drag.start.min(drag.current).max(plot.x);
        let right = drag.start.max(drag.current).min(plot.x + plot.width);
        if right > left {
            let band = Rect::new(left, plot.y, right - left, plot.height);
            frame.buffer_mut().set_style(band, app.theme.selection);
        }
    }
}

fn title(app: &App) -> String {
    let cascade = app.view.cascade();
    let mut parts = vec![cascade.metric.current().unwrap_or("(no metric)")];
    parts.extend(cascade.host.current());
    parts.extend(cascade.interface.current());
    let zoom = if app.view.zoom().applied().is_some() {
        " [zoomed]"
    } else {
        ""
    };
    format!(" {}{} ", parts.join(" · "), zoom)
}

/// Start, middle and end labels for a time axis.
pub fn time_labels(range: AxisRange) -> Vec<String> {
    let format = if range.width() > DAY_MS {
        "%m-%d %H:%M"
    } else {
        "%H:%M:%S"
    };
    [range.min, range.min + range.width() / 2.0, range.max]
        .iter()
        .map(|ms| format_time(*ms, format))
        .collect()
}

fn format_time(ms: f64, format: &str) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|t| t.with_timezone(&Local).format(format).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ranges_show_clock_time() {
        let labels = time_labels(AxisRange::between(0.0, 3_600_000.0));
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().all(|l| l.len() == 8), "{:?}", labels);
    }

    #[test]
    fn multi_day_ranges_show_dates() {
        let labels = time_labels(AxisRange::between(0.0, 3.0 * DAY_MS));
        assert!(labels.iter().all(|l| l.len() == 11), "{:?}", labels);
    }
}
