//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use laglens_core::{
    Host, HostRegistry, LatencyHistory, LatencyStatus, MapRasterizer, Marker, Measurement,
    StatsSnapshot, StatusThresholds,
};
use parking_lot::RwLock;

use crate::config::Settings;
use crate::monitor::{ReportReceiver, RoundReport};
use crate::ui::form::HostForm;
use crate::ui::hosts::SortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Host detail and the add-host form are overlays rather than views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// World map with host markers and a latest-latency panel.
    Map,
    /// Sortable table of per-host statistics.
    Hosts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Map => View::Hosts,
            View::Hosts => View::Map,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Map => "Map",
            View::Hosts => "Hosts",
        }
    }
}

/// Everything the views need to know about one host, computed per frame.
#[derive(Debug, Clone)]
pub struct HostRow {
    pub host: Host,
    pub latest: Option<Measurement>,
    pub stats: StatsSnapshot,
    pub sparkline: Vec<f64>,
    pub status: LatencyStatus,
}

impl HostRow {
    /// Latest latency, `None` when missing or failed.
    pub fn last_ms(&self) -> Option<f64> {
        self.latest.and_then(|m| m.latency_ms)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Shared with the coordinator
    pub registry: Arc<RwLock<HostRegistry>>,
    pub history: Arc<LatencyHistory>,
    pub map: Arc<MapRasterizer>,
    reports: Option<ReportReceiver>,
    pub last_report: Option<Arc<RoundReport>>,

    // Windows and thresholds
    pub stats_window: Duration,
    pub sparkline_window: Duration,
    pub sparkline_points: usize,
    pub thresholds: StatusThresholds,
    pub probe_interval: Duration,

    // Navigation state
    pub selected_host_index: usize,

    // Sorting (Hosts view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // Add-host form, open when `Some`
    pub form: Option<HostForm>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App over shared state.
    pub fn new(
        registry: Arc<RwLock<HostRegistry>>,
        history: Arc<LatencyHistory>,
        map: Arc<MapRasterizer>,
        settings: &Settings,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Map,
            show_help: false,
            show_detail_overlay: false,
            registry,
            history,
            map,
            reports: None,
            last_report: None,
            stats_window: settings.stats_window,
            sparkline_window: settings.sparkline_window,
            sparkline_points: settings.sparkline_points,
            thresholds: settings.thresholds,
            probe_interval: settings.probe_interval,
            selected_host_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            form: None,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Attach the coordinator's report channel.
    pub fn with_reports(mut self, reports: ReportReceiver) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Check the coordinator for a newly completed round.
    ///
    /// Returns true if a new round arrived since the last call.
    pub fn reload_data(&mut self) -> bool {
        let Some(reports) = self.reports.as_mut() else {
            return false;
        };

        if reports.has_changed().unwrap_or(false) {
            self.last_report = reports.borrow_and_update().clone();
            self.clamp_selection();
            true
        } else {
            false
        }
    }

    /// Per-host rows for every registered host, in registry order.
    pub fn host_rows(&self) -> Vec<HostRow> {
        self.host_rows_at(SystemTime::now())
    }

    pub fn host_rows_at(&self, now: SystemTime) -> Vec<HostRow> {
        let hosts = self.registry.read().list().to_vec();
        hosts
            .into_iter()
            .map(|host| {
                let latest = self.history.latest(&host.name);
                let stats = self
                    .history
                    .statistics_at(&host.name, self.stats_window, now);
                let sparkline = self.history.sparkline_at(
                    &host.name,
                    self.sparkline_window,
                    self.sparkline_points,
                    now,
                );
                let status = self.thresholds.classify(latest.map(|m| m.latency_ms));
                HostRow {
                    host,
                    latest,
                    stats,
                    sparkline,
                    status,
                }
            })
            .collect()
    }

    /// Rows after applying the filter and the current sort.
    pub fn visible_rows(&self) -> Vec<HostRow> {
        let mut rows: Vec<HostRow> = self
            .host_rows()
            .into_iter()
            .filter(|r| self.matches_filter(&r.host))
            .collect();
        crate::ui::hosts::sort_rows_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    /// Map markers for every host, coloured by status.
    pub fn markers(&self) -> Vec<Marker> {
        self.host_rows()
            .iter()
            .map(|r| Marker::new(r.host.latitude, r.host.longitude, r.status))
            .collect()
    }

    /// The row under the cursor in the Hosts view.
    pub fn selected_row(&self) -> Option<HostRow> {
        self.visible_rows().into_iter().nth(self.selected_host_index)
    }

    fn visible_count(&self) -> usize {
        let registry = self.registry.read();
        registry
            .list()
            .iter()
            .filter(|h| self.matches_filter(h))
            .count()
    }

    fn clamp_selection(&mut self) {
        let max = self.visible_count().saturating_sub(1);
        self.selected_host_index = self.selected_host_index.min(max);
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_count().saturating_sub(1);
        self.selected_host_index = (self.selected_host_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_host_index = self.selected_host_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_host_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_host_index = self.visible_count().saturating_sub(1);
    }

    /// Open the detail overlay for the selected host.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Hosts && self.visible_count() > 0 {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the Map view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Map {
            self.current_view = View::Map;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter mode keeping the current text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.selected_host_index = 0;
    }

    /// Add a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_host_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.selected_host_index = 0;
    }

    /// Case-insensitive match on name, address or city.
    pub fn matches_filter(&self, host: &Host) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let needle = self.filter_text.to_lowercase();
        [&host.name, &host.address, &host.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Open the add-host form.
    pub fn open_form(&mut self) {
        self.form = Some(HostForm::default());
    }

    /// Close the add-host form without adding anything.
    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validate the form and add its host to the registry.
    ///
    /// On error the form stays open and the error is shown in the status bar.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };

        let result = form
            .to_host()
            .and_then(|host| {
                let name = host.name.clone();
                self.registry
                    .write()
                    .add(host)
                    .map(|()| name)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(name) => {
                self.history.ensure_host(&name);
                self.form = None;
                self.set_status_message(format!(
                    "Added {name}; probing starts next round"
                ));
            }
            Err(e) => self.set_status_message(e),
        }
    }

    /// Write statistics for every host to `path`.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let registry = self.registry.read();
        crate::export::export_statistics(path, &registry, &self.history, self.stats_window)
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
