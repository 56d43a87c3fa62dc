//! Detail overlay rendering.
//!
//! Displays a modal overlay with full statistics and a latency trend for the
//! selected host.

use laglens_core::{LatencyStatus, StatusThresholds};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table},
    Frame,
};

use crate::app::{App, HostRow};
use crate::duration::{format_duration, format_ms};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the host detail as a modal overlay.
///
/// Shows the selected host's location, status, windowed statistics and a
/// sparkline of the recent trend.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(row) = app.selected_row() else {
        return;
    };

    // Width: 90% of screen, clamped to [MIN_OVERLAY_WIDTH, 90]
    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    // Height: 80% of screen, clamped to [MIN_OVERLAY_HEIGHT, 30]
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 30);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(6), // Host info
        Constraint::Length(9), // Statistics
        Constraint::Min(3),    // Sparkline
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    render_info(frame, app, &row, chunks[0]);
    render_stats(frame, app, &row, chunks[1]);
    render_trend(frame, app, &row, chunks[2]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓:previous/next host  Esc:close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}

fn render_info(frame: &mut Frame, app: &App, row: &HostRow, area: Rect) {
    let status_style = app.theme.status_style(row.status);
    let last = match row.latest {
        None => "no measurement yet".to_string(),
        Some(m) => m
            .latency_ms
            .map(format_ms)
            .unwrap_or_else(|| "probe failed".to_string()),
    };

    let lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", row.host.name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw(" Address: "),
            Span::styled(
                row.host.address.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    City: "),
            Span::raw(row.host.city.clone()),
        ]),
        Line::from(format!(
            " Location: {:.4}, {:.4}",
            row.host.latitude, row.host.longitude
        )),
        Line::from(vec![
            Span::raw(" Last: "),
            Span::styled(last, status_style),
            Span::raw("    Status: "),
            Span::styled(
                format!("{} {}", row.status.glyph(), row.status.label()),
                status_style.add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let block = Block::default()
        .title(" Host Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_stats(frame: &mut Frame, app: &App, row: &HostRow, area: Rect) {
    let stats = &row.stats;
    let opt_ms = |v: Option<f64>| v.map(format_ms).unwrap_or_else(|| "-".to_string());

    let rows = vec![
        Row::new(vec![Cell::from("Minimum"), Cell::from(opt_ms(stats.min))]),
        Row::new(vec![Cell::from("Maximum"), Cell::from(opt_ms(stats.max))]),
        Row::new(vec![Cell::from("Average"), Cell::from(opt_ms(stats.avg))]),
        Row::new(vec![Cell::from("Jitter"), Cell::from(opt_ms(stats.jitter))]),
        Row::new(vec![
            Cell::from("Packet loss"),
            Cell::from(
                stats
                    .packet_loss_pct
                    .map(|p| format!("{:.1}%", p))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Row::new(vec![
            Cell::from("Samples"),
            Cell::from(stats.samples.to_string()),
        ]),
    ];

    let widths = [Constraint::Length(14), Constraint::Fill(1)];
    let header = Row::new(vec![Cell::from("Metric"), Cell::from("Value")])
        .height(1)
        .style(app.theme.header);

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Statistics (last {}) ", format_duration(app.stats_window)))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

fn render_trend(frame: &mut Frame, app: &App, row: &HostRow, area: Rect) {
    let block = Block::default()
        .title(format!(" Trend (last {}) ", format_duration(app.sparkline_window)))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if row.stats.samples == 0 {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No measurements in window",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let data = sparkline_data(&row.sparkline);
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .style(app.theme.status_style(trend_status(&app.thresholds, &row.sparkline)));
    frame.render_widget(sparkline, area);
}

/// Whole-millisecond bars for the sparkline widget.
fn sparkline_data(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.max(0.0).round() as u64).collect()
}

/// Status tier of the mean plotted latency.
fn trend_status(thresholds: &StatusThresholds, values: &[f64]) -> LatencyStatus {
    if values.is_empty() {
        return LatencyStatus::Unknown;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    thresholds.classify_ms(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_colour_follows_mean_latency() {
        let t = StatusThresholds::default();
        // Latest sample is fast but the window averages slow
        assert_eq!(trend_status(&t, &[250.0, 250.0, 10.0]), LatencyStatus::Degraded);
        assert_eq!(trend_status(&t, &[20.0, 40.0]), LatencyStatus::Good);
        assert_eq!(trend_status(&t, &[900.0, 400.0]), LatencyStatus::Down);
        assert_eq!(trend_status(&t, &[]), LatencyStatus::Unknown);
    }

    #[test]
    fn sparkline_data_rounds_and_clamps() {
        assert_eq!(sparkline_data(&[0.0, 12.4, 12.6, -3.0]), vec![0, 12, 13, 0]);
    }
}
