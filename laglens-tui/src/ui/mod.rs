//! Terminal rendering using ratatui.
//!
//! - [`map`]: world map with host markers and the latest-latency panel
//! - [`hosts`]: sortable statistics table
//! - [`detail`]: per-host overlay with a sparkline
//! - [`form`]: add-host overlay
//! - [`common`]: header, tabs, status bar, help
//! - [`theme`]: colors and styles

pub mod common;
pub mod detail;
pub mod form;
pub mod hosts;
pub mod map;
pub mod theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub use hosts::SortColumn;
pub use theme::Theme;

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Row where view content starts (after header and tabs).
pub const CONTENT_START_ROW: u16 = 2;

/// Draw one frame of the dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Map => map::render(frame, app, chunks[2]),
        View::Hosts => hosts::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.form.is_some() {
        form::render(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
