//! Per-host latency time series with windowed statistics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;

/// One probe result. `latency_ms` is `None` when the probe failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub latency_ms: Option<f64>,
    pub timestamp: SystemTime,
}

impl Measurement {
    pub fn is_failure(&self) -> bool {
        self.latency_ms.is_none()
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Aggregates over a trailing window. Never stored, always derived.
///
/// Every field is `None` when the window holds no measurements at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    /// Mean absolute difference between consecutive successful samples.
    pub jitter: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    /// Measurements in the window, failures included.
    #[cfg_attr(feature = "serde", serde(default))]
    pub samples: usize,
}

impl StatsSnapshot {
    /// Compute statistics over an already-windowed, time-ordered slice.
    ///
    /// Failures count toward packet loss only, and a non-finite latency is a
    /// failure. Jitter compares each successful sample with the previous
    /// successful one, skipping failures.
    pub fn from_measurements(window: &[Measurement]) -> Self {
        if window.is_empty() {
            return Self::default();
        }

        let present: Vec<f64> = window
            .iter()
            .filter_map(|m| m.latency_ms)
            .filter(|v| v.is_finite())
            .collect();
        let failed = window.len() - present.len();
        let packet_loss_pct = Some(100.0 * failed as f64 / window.len() as f64);

        let jitter = if present.len() < 2 {
            0.0
        } else {
            let total: f64 = present.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
            total / (present.len() - 1) as f64
        };

        if present.is_empty() {
            return Self {
                jitter: Some(jitter),
                packet_loss_pct,
                samples: window.len(),
                ..Self::default()
            };
        }

        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = present.iter().sum::<f64>() / present.len() as f64;

        Self {
            min: Some(min),
            max: Some(max),
            avg: Some(avg.max(min).min(max)),
            jitter: Some(jitter),
            packet_loss_pct,
            samples: window.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

/// Keep every Nth value, N = ceil(len / max_points), so at most `max_points` remain.
///
/// Returns `[0.0]` for an empty input so there is always something to draw.
pub fn downsample(values: &[f64], max_points: usize) -> Vec<f64> {
    if values.is_empty() {
        return vec![0.0];
    }
    let max_points = max_points.max(1);
    let stride = values.len().div_ceil(max_points);
    values.iter().step_by(stride).copied().collect()
}

/// Measurements per sealed chunk.
const CHUNK_LEN: usize = 256;

#[derive(Debug, Default)]
struct Chunks {
    /// Full chunks, never mutated again.
    sealed: Vec<Arc<[Measurement]>>,
    /// Chunk being filled, at most `CHUNK_LEN - 1` entries.
    tail: Vec<Measurement>,
}

impl Chunks {
    fn last(&self) -> Option<&Measurement> {
        self.tail
            .last()
            .or_else(|| self.sealed.last().and_then(|c| c.last()))
    }

    fn len(&self) -> usize {
        self.sealed.len() * CHUNK_LEN + self.tail.len()
    }
}

/// Append-only measurements for a single host.
///
/// Storage is a list of immutable chunks plus a short tail. A read holds the
/// lock only long enough to clone the chunk handles it needs and the tail,
/// which fixes the length it will see; the copy happens after release.
#[derive(Debug, Default)]
pub struct LatencySeries {
    chunks: RwLock<Chunks>,
}

impl LatencySeries {
    fn push(&self, mut measurement: Measurement) {
        let mut chunks = self.chunks.write();
        if let Some(last) = chunks.last() {
            if measurement.timestamp < last.timestamp {
                tracing::debug!("clamping out-of-order measurement to series tail");
                measurement.timestamp = last.timestamp;
            }
        }
        chunks.tail.push(measurement);
        if chunks.tail.len() == CHUNK_LEN {
            let full = std::mem::replace(&mut chunks.tail, Vec::with_capacity(CHUNK_LEN));
            chunks.sealed.push(full.into());
        }
    }

    /// Copy of the measurements with `timestamp >= cutoff`.
    fn window(&self, cutoff: Option<SystemTime>) -> Vec<Measurement> {
        let (sealed, tail) = {
            let chunks = self.chunks.read();
            let first = match cutoff {
                Some(cutoff) => chunks
                    .sealed
                    .partition_point(|c| c.last().is_some_and(|m| m.timestamp < cutoff)),
                None => 0,
            };
            (chunks.sealed[first..].to_vec(), chunks.tail.clone())
        };

        let total = sealed.iter().map(|c| c.len()).sum::<usize>() + tail.len();
        let mut out = Vec::with_capacity(total);
        for chunk in &sealed {
            out.extend_from_slice(chunk);
        }
        out.extend_from_slice(&tail);

        let start = match cutoff {
            Some(cutoff) => out.partition_point(|m| m.timestamp < cutoff),
            None => 0,
        };
        out.split_off(start)
    }

    fn last(&self) -> Option<Measurement> {
        self.chunks.read().last().copied()
    }

    fn len(&self) -> usize {
        self.chunks.read().len()
    }
}

/// Latency series for every host, keyed by host name.
///
/// Each series has its own lock, so a writer recording one host never
/// blocks readers of another.
#[derive(Debug, Default)]
pub struct LatencyHistory {
    series: RwLock<HashMap<String, Arc<LatencySeries>>>,
}

impl LatencyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the series for a host.
    fn series(&self, host: &str) -> Arc<LatencySeries> {
        // Fast path
        {
            let series = self.series.read();
            if let Some(s) = series.get(host) {
                return s.clone();
            }
        }

        // Slow path
        let mut series = self.series.write();
        series.entry(host.to_string()).or_default().clone()
    }

    fn existing(&self, host: &str) -> Option<Arc<LatencySeries>> {
        self.series.read().get(host).cloned()
    }

    /// Register an empty series so a new host shows up before its first probe.
    pub fn ensure_host(&self, host: &str) {
        self.series(host);
    }

    /// Append a measurement. `None` latency records a failed probe, and so
    /// does a non-finite one.
    pub fn record(&self, host: &str, latency_ms: Option<f64>, timestamp: SystemTime) {
        self.series(host).push(Measurement {
            latency_ms: latency_ms.filter(|v| v.is_finite()),
            timestamp,
        });
    }

    /// Statistics over the trailing `window` ending now.
    pub fn statistics(&self, host: &str, window: Duration) -> StatsSnapshot {
        self.statistics_at(host, window, SystemTime::now())
    }

    /// Statistics over `[now - window, ..)`.
    pub fn statistics_at(&self, host: &str, window: Duration, now: SystemTime) -> StatsSnapshot {
        StatsSnapshot::from_measurements(&self.recent_at(host, window, now))
    }

    /// Downsampled successful latencies in the trailing window ending now.
    pub fn sparkline(&self, host: &str, window: Duration, max_points: usize) -> Vec<f64> {
        self.sparkline_at(host, window, max_points, SystemTime::now())
    }

    /// Downsampled successful latencies in `[now - window, ..)`, never empty.
    pub fn sparkline_at(
        &self,
        host: &str,
        window: Duration,
        max_points: usize,
        now: SystemTime,
    ) -> Vec<f64> {
        let present: Vec<f64> = self
            .recent_at(host, window, now)
            .iter()
            .filter_map(|m| m.latency_ms)
            .collect();
        downsample(&present, max_points)
    }

    /// Measurements in the trailing window ending now.
    pub fn recent(&self, host: &str, window: Duration) -> Vec<Measurement> {
        self.recent_at(host, window, SystemTime::now())
    }

    /// Measurements with `timestamp >= now - window`.
    pub fn recent_at(&self, host: &str, window: Duration, now: SystemTime) -> Vec<Measurement> {
        match self.existing(host) {
            Some(series) => series.window(now.checked_sub(window)),
            None => Vec::new(),
        }
    }

    /// Most recent measurement for a host.
    pub fn latest(&self, host: &str) -> Option<Measurement> {
        self.existing(host)?.last()
    }

    /// Total measurements recorded for a host.
    pub fn len(&self, host: &str) -> usize {
        self.existing(host).map_or(0, |s| s.len())
    }

    /// Names of all hosts with a series.
    pub fn hosts(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    fn history_with(values: &[Option<f64>]) -> LatencyHistory {
        let h = LatencyHistory::new();
        for (i, v) in values.iter().enumerate() {
            h.record("host", *v, at(i as u64 * 5));
        }
        h
    }

    #[test]
    fn two_successes_and_one_failure() {
        let h = history_with(&[Some(40.0), None, Some(60.0)]);
        let s = h.statistics_at("host", HOUR, at(60));

        assert_eq!(s.min, Some(40.0));
        assert_eq!(s.max, Some(60.0));
        assert_eq!(s.avg, Some(50.0));
        assert_eq!(s.jitter, Some(20.0));
        let loss = s.packet_loss_pct.unwrap();
        assert!((loss - 33.333).abs() < 0.01, "loss was {loss}");
        assert_eq!(s.samples, 3);
    }

    #[test]
    fn empty_window_has_no_fields() {
        let h = LatencyHistory::new();
        assert_eq!(h.statistics_at("missing", HOUR, at(0)), StatsSnapshot::default());

        let h = history_with(&[Some(10.0)]);
        let s = h.statistics_at("host", Duration::from_secs(10), at(7200));
        assert!(s.is_empty());
        assert_eq!(s.packet_loss_pct, None);
        assert_eq!(s.avg, None);
    }

    #[test]
    fn all_failures_is_full_loss() {
        let h = history_with(&[None, None, None]);
        let s = h.statistics_at("host", HOUR, at(60));
        assert_eq!(s.packet_loss_pct, Some(100.0));
        assert_eq!(s.min, None);
        assert_eq!(s.avg, None);
        assert_eq!(s.jitter, Some(0.0));
    }

    #[test]
    fn loss_is_bounded_and_full_only_when_all_fail() {
        let patterns: &[&[Option<f64>]] = &[
            &[Some(1.0)],
            &[None],
            &[Some(1.0), None],
            &[None, None, Some(3.0), None],
            &[Some(5.0), Some(6.0), Some(7.0)],
        ];
        for pattern in patterns {
            let h = history_with(pattern);
            let loss = h
                .statistics_at("host", HOUR, at(60))
                .packet_loss_pct
                .unwrap();
            assert!((0.0..=100.0).contains(&loss));
            assert_eq!(loss == 100.0, pattern.iter().all(Option::is_none));
        }
    }

    #[test]
    fn avg_between_min_and_max() {
        let h = history_with(&[Some(0.1), Some(0.2), Some(0.7), None, Some(1e6), Some(3.3)]);
        let s = h.statistics_at("host", HOUR, at(60));
        assert!(s.min.unwrap() <= s.avg.unwrap());
        assert!(s.avg.unwrap() <= s.max.unwrap());
    }

    #[test]
    fn constant_series_has_zero_jitter() {
        let h = history_with(&[Some(42.0); 10]);
        assert_eq!(h.statistics_at("host", HOUR, at(60)).jitter, Some(0.0));
    }

    #[test]
    fn jitter_skips_failures() {
        let h = history_with(&[Some(10.0), None, None, Some(30.0), Some(20.0)]);
        // |30 - 10| and |20 - 30| over two gaps.
        assert_eq!(h.statistics_at("host", HOUR, at(60)).jitter, Some(15.0));
    }

    #[test]
    fn window_excludes_older_measurements() {
        let h = LatencyHistory::new();
        h.record("host", Some(500.0), at(0));
        h.record("host", Some(10.0), at(3000));
        h.record("host", Some(20.0), at(3500));

        let s = h.statistics_at("host", Duration::from_secs(1000), at(3600));
        assert_eq!(s.samples, 2);
        assert_eq!(s.max, Some(20.0));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let h = LatencyHistory::new();
        h.record("host", Some(1.0), at(100));
        let s = h.statistics_at("host", Duration::from_secs(50), at(150));
        assert_eq!(s.samples, 1);
    }

    #[test]
    fn out_of_order_timestamps_are_clamped() {
        let h = LatencyHistory::new();
        h.record("host", Some(1.0), at(100));
        h.record("host", Some(2.0), at(50));
        let recent = h.recent_at("host", HOUR, at(200));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].timestamp, at(100));
    }

    #[test]
    fn sparkline_placeholder_without_successes() {
        let h = history_with(&[None, None]);
        assert_eq!(h.sparkline_at("host", HOUR, 50, at(60)), vec![0.0]);
        assert_eq!(h.sparkline_at("unknown", HOUR, 50, at(60)), vec![0.0]);
    }

    #[test]
    fn sparkline_downsamples_by_stride() {
        let values: Vec<f64> = (0..120).map(|i| i as f64).collect();
        let out = downsample(&values, 50);
        // ceil(120 / 50) = 3
        assert_eq!(out.len(), 40);
        assert_eq!(&out[..3], &[0.0, 3.0, 6.0]);

        let short = downsample(&[1.0, 2.0], 50);
        assert_eq!(short, vec![1.0, 2.0]);

        let exact = downsample(&values[..100], 50);
        assert_eq!(exact.len(), 50);
    }

    #[test]
    fn sparkline_never_exceeds_max_points() {
        for len in 1..200 {
            let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
            for max in [1, 7, 50] {
                let out = downsample(&values, max);
                assert!(!out.is_empty());
                assert!(out.len() <= max);
            }
        }
    }

    #[test]
    fn non_finite_latency_counts_as_failure() {
        let h = history_with(&[Some(f64::NAN)]);
        let s = h.statistics_at("host", HOUR, at(60));
        assert_eq!(s.packet_loss_pct, Some(100.0));
        assert_eq!(s.avg, None);
        assert!(h.latest("host").unwrap().is_failure());

        // Built directly, bypassing record
        let direct = [Measurement {
            latency_ms: Some(f64::NAN),
            timestamp: at(0),
        }];
        assert_eq!(
            StatsSnapshot::from_measurements(&direct).packet_loss_pct,
            Some(100.0)
        );

        let h = history_with(&[Some(10.0), Some(f64::NAN), Some(f64::INFINITY), Some(30.0)]);
        let s = h.statistics_at("host", HOUR, at(60));
        assert_eq!(s.min, Some(10.0));
        assert_eq!(s.max, Some(30.0));
        assert_eq!(s.avg, Some(20.0));
        assert_eq!(s.jitter, Some(20.0));
        assert_eq!(s.packet_loss_pct, Some(50.0));
    }

    #[test]
    fn window_spans_chunk_boundaries() {
        let h = LatencyHistory::new();
        let n = CHUNK_LEN as u64 * 3 + 17;
        for i in 0..n {
            h.record("host", Some(i as f64), at(i));
        }
        assert_eq!(h.len("host"), n as usize);
        assert_eq!(h.latest("host").unwrap().latency_ms, Some((n - 1) as f64));

        // Cutoff lands inside the second sealed chunk
        let cutoff = CHUNK_LEN as u64 + 40;
        let recent = h.recent_at("host", Duration::from_secs(n - cutoff), at(n));
        assert_eq!(recent.len(), (n - cutoff) as usize);
        assert_eq!(recent[0].latency_ms, Some(cutoff as f64));
        assert!(recent.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        let all = h.recent_at("host", Duration::from_secs(u32::MAX as u64), at(n));
        assert_eq!(all.len(), n as usize);
    }

    #[test]
    fn clamping_sees_tail_of_sealed_chunk() {
        let h = LatencyHistory::new();
        for i in 0..CHUNK_LEN as u64 {
            h.record("host", Some(1.0), at(100 + i));
        }
        // Tail is empty now; the bound comes from the last sealed chunk
        h.record("host", Some(2.0), at(0));
        assert_eq!(h.latest("host").unwrap().timestamp, at(100 + CHUNK_LEN as u64 - 1));
    }

    #[test]
    fn latest_and_hosts() {
        let h = LatencyHistory::new();
        assert!(h.latest("a").is_none());
        h.ensure_host("b");
        h.record("a", Some(5.0), at(0));
        h.record("a", None, at(5));

        assert!(h.latest("a").unwrap().is_failure());
        assert!(h.latest("b").is_none());
        assert_eq!(h.hosts(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(h.len("a"), 2);
    }

    #[test]
    fn readers_tolerate_concurrent_appends() {
        let h = Arc::new(LatencyHistory::new());
        let writer = {
            let h = h.clone();
            std::thread::spawn(move || {
                for i in 0..2000 {
                    h.record("host", Some((i % 7) as f64), at(i));
                }
            })
        };

        for _ in 0..200 {
            let s = h.statistics_at("host", Duration::from_secs(u32::MAX as u64), at(5000));
            if let (Some(min), Some(avg), Some(max)) = (s.min, s.avg, s.max) {
                assert!(min <= avg && avg <= max);
            }
        }
        writer.join().unwrap();
        assert_eq!(h.len("host"), 2000);
    }
}
