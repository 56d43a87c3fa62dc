//! JSON export of per-host statistics.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use laglens_core::{HostRegistry, LatencyHistory};
use serde_json::{json, Map, Value};

/// `laglens_stats_<unix-seconds>.json` in the working directory.
pub fn default_export_path(now: SystemTime) -> PathBuf {
    let secs = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    PathBuf::from(format!("laglens_stats_{secs}.json"))
}

/// Build the export document: one entry per host keyed by name.
pub fn build_export(
    registry: &HostRegistry,
    history: &LatencyHistory,
    window: Duration,
    now: SystemTime,
) -> Value {
    let mut export = Map::new();

    for host in registry.list() {
        let stats = history.statistics_at(&host.name, window, now);
        let recent: Vec<Value> = history
            .recent_at(&host.name, window, now)
            .iter()
            .map(|m| {
                json!({
                    "latency_ms": m.latency_ms,
                    "timestamp_ms": m.timestamp_ms(),
                })
            })
            .collect();

        export.insert(
            host.name.clone(),
            json!({
                "address": host.address,
                "city": host.city,
                "latitude": host.latitude,
                "longitude": host.longitude,
                "statistics": stats,
                "recent_measurements": recent,
            }),
        );
    }

    Value::Object(export)
}

/// Write statistics over the trailing `window` to `path` as pretty JSON.
pub fn export_statistics(
    path: &Path,
    registry: &HostRegistry,
    history: &LatencyHistory,
    window: Duration,
) -> Result<()> {
    let export = build_export(registry, history, window, SystemTime::now());
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    tracing::info!(path = %path.display(), hosts = registry.len(), "exported statistics");
    Ok(())
}
