//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use laglens_core::geo::CellStyle;
use laglens_core::LatencyStatus;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for latencies under the degraded threshold.
    pub good: Color,
    /// Color for degraded latencies.
    pub degraded: Color,
    /// Color for failed or very slow hosts.
    pub down: Color,
    /// Color for hosts that have not been probed yet.
    pub unknown: Color,
    /// Color for land on the world map.
    pub land: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            good: Color::Green,
            degraded: Color::Yellow,
            down: Color::Red,
            unknown: Color::Gray,
            land: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            good: Color::Green,
            degraded: Color::Yellow,
            down: Color::Red,
            unknown: Color::DarkGray,
            land: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
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

    /// Get style for a latency status
    pub fn status_style(&self, status: LatencyStatus) -> Style {
        match status {
            LatencyStatus::Unknown => Style::default().fg(self.unknown),
            LatencyStatus::Good => Style::default().fg(self.good),
            LatencyStatus::Degraded => Style::default().fg(self.degraded),
            LatencyStatus::Down => Style::default().fg(self.down).add_modifier(Modifier::BOLD),
        }
    }

    /// Get style for a rendered map cell
    pub fn cell_style(&self, style: CellStyle) -> Style {
        match style {
            CellStyle::Water => Style::default(),
            CellStyle::Land => Style::default().fg(self.land).add_modifier(Modifier::DIM),
            CellStyle::Marker(status) => self.status_style(status).add_modifier(Modifier::BOLD),
        }
    }
}
