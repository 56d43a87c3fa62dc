//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use std::time::SystemTime;

use laglens_core::LatencyStatus;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::duration::format_duration;

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, host counts by tier, total host count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.host_rows();

    let mut good = 0;
    let mut degraded = 0;
    let mut down = 0;
    for row in &rows {
        match row.status {
            LatencyStatus::Good => good += 1,
            LatencyStatus::Degraded => degraded += 1,
            LatencyStatus::Down => down += 1,
            LatencyStatus::Unknown => {}
        }
    }

    // Worst tier across the fleet
    let overall = rows
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(LatencyStatus::Unknown);

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("LAGLENS ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", good), Style::default().fg(app.theme.good)),
        Span::raw(" good "),
        if degraded > 0 {
            Span::styled(
                format!("{}", degraded),
                Style::default().fg(app.theme.degraded),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" slow "),
        if down > 0 {
            Span::styled(
                format!("{}", down),
                Style::default().fg(app.theme.down).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down │ "),
        Span::styled(
            format!("{}", rows.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" hosts"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Map "), Line::from(" 2:Hosts ")];

    let selected = match app.current_view {
        View::Map => 0,
        View::Hosts => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: current view, time since the last round, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.form.is_some() {
        "Tab:next field Enter:add Esc:cancel"
    } else if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Map => "n:add e:export Tab:switch ?:help q:quit",
            View::Hosts => "/:search s:sort S:reverse Enter:detail n:add e:export ?:help q:quit",
        }
    };

    let round = match app.last_report.as_ref() {
        Some(report) => {
            let ago = SystemTime::now()
                .duration_since(report.started_at)
                .unwrap_or_default();
            format!(
                "Round {} {} ago, every {}",
                report.round,
                format_duration(ago),
                format_duration(app.probe_interval)
            )
        }
        None => "Probing...".to_string(),
    };

    let status = format!(" {} | {} | {}", app.current_view.label(), round, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1 / 2       Map / Hosts"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Host detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Hosts"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from("  n         Add a host"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Redraw"),
        Line::from("  e         Export statistics to JSON"),
        Line::from("  q         Quit"),
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

    // Center the help overlay, responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 27u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
