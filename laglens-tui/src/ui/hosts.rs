//! Hosts view rendering.
//!
//! Displays a table of every host with its latest latency, windowed
//! statistics, packet loss and a sparkline trend.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, HostRow};
use crate::duration::format_ms;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the inline trend column.
const TREND_WIDTH: usize = 12;

/// Column to sort by in the Hosts view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by host name alphabetically.
    #[default]
    Name,
    /// Sort by latest latency.
    Last,
    /// Sort by windowed average latency.
    Average,
    /// Sort by jitter.
    Jitter,
    /// Sort by packet loss.
    Loss,
    /// Sort by status severity.
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Last,
            SortColumn::Last => SortColumn::Average,
            SortColumn::Average => SortColumn::Jitter,
            SortColumn::Jitter => SortColumn::Loss,
            SortColumn::Loss => SortColumn::Status,
            SortColumn::Status => SortColumn::Name,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Last => "last",
            SortColumn::Average => "avg",
            SortColumn::Jitter => "jitter",
            SortColumn::Loss => "loss",
            SortColumn::Status => "status",
        }
    }
}

/// Render the Hosts view as a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.visible_rows();
    let total = app.registry.read().len();

    let header = Row::new(vec![
        Cell::from(format_header("Host", SortColumn::Name, app)),
        Cell::from("Address"),
        Cell::from(format_header("Last", SortColumn::Last, app)),
        Cell::from(format_header("Avg", SortColumn::Average, app)),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from(format_header("Jitter", SortColumn::Jitter, app)),
        Cell::from(format_header("Loss", SortColumn::Loss, app)),
        Cell::from("Trend"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|r| {
            let status_style = app.theme.status_style(r.status);
            let last = match r.latest {
                None => "-".to_string(),
                Some(m) => m.latency_ms.map(format_ms).unwrap_or_else(|| "FAIL".to_string()),
            };
            let loss_style = match r.stats.packet_loss_pct {
                Some(p) if p >= 50.0 => app.theme.status_style(laglens_core::LatencyStatus::Down),
                Some(p) if p > 0.0 => {
                    app.theme.status_style(laglens_core::LatencyStatus::Degraded)
                }
                _ => Style::default(),
            };

            Row::new(vec![
                Cell::from(r.host.name.clone()),
                Cell::from(r.host.address.clone()),
                Cell::from(last).style(status_style),
                Cell::from(opt_ms(r.stats.avg)),
                Cell::from(opt_ms(r.stats.min)),
                Cell::from(opt_ms(r.stats.max)),
                Cell::from(opt_ms(r.stats.jitter)),
                Cell::from(
                    r.stats
                        .packet_loss_pct
                        .map(|p| format!("{:.1}%", p))
                        .unwrap_or_else(|| "-".to_string()),
                )
                .style(loss_style),
                Cell::from(render_sparkline(&r.sparkline, TREND_WIDTH)),
                Cell::from(format!("{} {}", r.status.glyph(), r.status.label()))
                    .style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Host
        Constraint::Fill(2), // Address
        Constraint::Fill(1), // Last
        Constraint::Fill(1), // Avg
        Constraint::Fill(1), // Min
        Constraint::Fill(1), // Max
        Constraint::Fill(1), // Jitter
        Constraint::Fill(1), // Loss
        Constraint::Min(TREND_WIDTH as u16), // Trend
        Constraint::Min(7), // Status
    ];

    let selected_visual_index = app.selected_host_index.min(rows.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, rows.len())
    } else {
        String::new()
    };

    let title = format!(
        " Hosts ({}/{}) [s:sort {}{}]{}{} ",
        rows.len(),
        total,
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

fn opt_ms(v: Option<f64>) -> String {
    v.map(format_ms).unwrap_or_else(|| "-".to_string())
}

/// Missing values sort after present ones in ascending order.
fn cmp_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort rows by the given column and direction (public for use in app.rs)
pub fn sort_rows_by(rows: &mut [HostRow], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.host.name.cmp(&b.host.name),
            SortColumn::Last => cmp_opt(a.last_ms(), b.last_ms()),
            SortColumn::Average => cmp_opt(a.stats.avg, b.stats.avg),
            SortColumn::Jitter => cmp_opt(a.stats.jitter, b.stats.jitter),
            SortColumn::Loss => cmp_opt(a.stats.packet_loss_pct, b.stats.packet_loss_pct),
            SortColumn::Status => a.status.cmp(&b.status),
        };

        // Apply direction to primary comparison
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by name for stability when primary values are equal
        if primary == Ordering::Equal {
            a.host.name.cmp(&b.host.name)
        } else {
            primary
        }
    });
}

/// Scale the most recent `width` values into block characters.
pub fn render_sparkline(data: &[f64], width: usize) -> String {
    let values: Vec<f64> = data.iter().rev().take(width).rev().copied().collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if values.is_empty() || max <= 0.0 {
        return " ".repeat(width);
    }

    let mut out: String = values
        .iter()
        .map(|v| {
            let level = ((v / max) * 7.0).round().clamp(0.0, 7.0) as usize;
            SPARKLINE_CHARS[level]
        })
        .collect();
    for _ in values.len()..width {
        out.push(' ');
    }
    out
}
