//! Map view rendering.
//!
//! Draws the rasterized world map sized to the panel, with a side panel
//! listing each host's most recent latency.

use std::time::SystemTime;

use laglens_core::Grid;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::duration::{format_duration, format_ms};
use crate::ui::Theme;

/// Width of the latest-latency panel.
const PANEL_WIDTH: u16 = 30;

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_latest(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" World ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    match app.map.render(inner.width, inner.height, &app.markers()) {
        Ok(grid) => frame.render_widget(Paragraph::new(grid_lines(&grid, &app.theme)), inner),
        Err(e) => {
            tracing::warn!(error = %e, "map render failed");
            frame.render_widget(Paragraph::new(e.to_string()), inner);
        }
    }
}

/// Convert a grid to styled lines, merging runs of equally styled cells.
pub fn grid_lines(grid: &Grid, theme: &Theme) -> Vec<Line<'static>> {
    grid.lines()
        .map(|cells| {
            let mut spans = Vec::new();
            let mut run = String::new();
            let mut run_style = None;

            for cell in cells {
                if let Some(prev) = run_style.filter(|&s| s != cell.style) {
                    spans.push(Span::styled(std::mem::take(&mut run), theme.cell_style(prev)));
                }
                run_style = Some(cell.style);
                run.push(cell.glyph);
            }
            if let Some(s) = run_style {
                spans.push(Span::styled(run, theme.cell_style(s)));
            }
            Line::from(spans)
        })
        .collect()
}

fn render_latest(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    for row in app.host_rows() {
        let style = app.theme.status_style(row.status);
        let reading = match row.latest {
            None => Span::styled("waiting", style),
            Some(m) => match m.latency_ms {
                Some(ms) => Span::styled(format!("{} {}", row.status.glyph(), format_ms(ms)), style),
                None => Span::styled(format!("{} FAILED", row.status.glyph()), style),
            },
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<15}", truncate(&row.host.name, 15)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            reading,
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", truncate(&row.host.city, (PANEL_WIDTH as usize).saturating_sub(5))),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    lines.push(Line::from(""));
    let footer = match app.last_report.as_ref() {
        Some(report) => {
            let ago = SystemTime::now()
                .duration_since(report.started_at)
                .unwrap_or_default();
            format!(" Round {} · {} ago", report.round, format_duration(ago))
        }
        None => " Waiting for first round...".to_string(),
    };
    lines.push(Line::from(Span::styled(
        footer,
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Latest ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laglens_core::{LatencyStatus, MapRasterizer, Marker};

    #[test]
    fn runs_are_merged_per_style() {
        let map = MapRasterizer::bundled().unwrap();
        let grid = map
            .render(40, 12, &[Marker::new(-25.0, 134.0, LatencyStatus::Good)])
            .unwrap();
        let lines = grid_lines(&grid, &Theme::dark());

        assert_eq!(lines.len(), 12);
        for (line, cells) in lines.iter().zip(grid.lines()) {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            let expected: String = cells.iter().map(|c| c.glyph).collect();
            assert_eq!(text, expected);
            // Adjacent spans never share a style
            assert!(line.spans.windows(2).all(|w| w[0].style != w[1].style));
        }
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("ap-southeast-1", 15), "ap-southeast-1");
        assert_eq!(truncate("Cape Town, South Africa", 10), "Cape Town…");
    }
}
