//! Latency classification into display tiers.

use std::time::Duration;

/// Display tier for a host, derived from its latest measurement.
///
/// Ordered by severity so the worst of a set can be found with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LatencyStatus {
    /// No measurement recorded yet.
    Unknown,
    Good,
    Degraded,
    /// Probe failed or latency is above the down threshold.
    Down,
}

impl LatencyStatus {
    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            LatencyStatus::Unknown => "WAIT",
            LatencyStatus::Good => "OK",
            LatencyStatus::Degraded => "SLOW",
            LatencyStatus::Down => "DOWN",
        }
    }

    /// Map glyph for a host marker.
    pub fn glyph(&self) -> char {
        match self {
            LatencyStatus::Unknown => '○',
            _ => '●',
        }
    }
}

/// Latency thresholds separating the three tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusThresholds {
    /// Latencies at or above this are degraded.
    pub degraded_ms: f64,
    /// Latencies strictly above this are down.
    pub down_ms: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            degraded_ms: 100.0,
            down_ms: 300.0,
        }
    }
}

impl StatusThresholds {
    /// Classify an optional latest measurement.
    ///
    /// `None` means no measurement yet; `Some(None)` means the last probe failed.
    pub fn classify(&self, latest: Option<Option<f64>>) -> LatencyStatus {
        match latest {
            None => LatencyStatus::Unknown,
            Some(None) => LatencyStatus::Down,
            Some(Some(ms)) => self.classify_ms(ms),
        }
    }

    /// Classify a successful latency in milliseconds.
    pub fn classify_ms(&self, ms: f64) -> LatencyStatus {
        if ms < self.degraded_ms {
            LatencyStatus::Good
        } else if ms <= self.down_ms {
            LatencyStatus::Degraded
        } else {
            LatencyStatus::Down
        }
    }
}

/// Convert a duration to fractional milliseconds.
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}
