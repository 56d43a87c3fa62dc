//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. An optional TOML/JSON/YAML file passed with `--config`
//! 3. Environment variables prefixed with `LAGLENS_` (nested keys use `__`,
//!    e.g. `LAGLENS_THRESHOLDS__DOWN_MS=250`)
//! 4. Command-line flags
//!
//! ```toml
//! probe_interval = "10s"
//! probe_timeout = "3s"
//! stats_window = "2h"
//!
//! [[hosts]]
//! name = "edge-fra"
//! address = "203.0.113.10"
//! latitude = 50.11
//! longitude = 8.68
//! city = "Frankfurt"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use laglens_core::{default_hosts, Host, StatusThresholds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::serde_duration;

/// Errors raised while assembling or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The probe timeout must leave room before the next round.
    #[error("Probe timeout ({timeout:?}) must be shorter than the probe interval ({interval:?})")]
    TimeoutNotBelowInterval {
        timeout: Duration,
        interval: Duration,
    },

    /// A duration or count that must be positive was zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Replaced wholesale by a file's `[[hosts]]` list.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<Host>,
    #[serde(with = "serde_duration")]
    pub probe_interval: Duration,
    #[serde(with = "serde_duration")]
    pub probe_timeout: Duration,
    pub probe_port: u16,
    /// Window for the statistics columns.
    #[serde(with = "serde_duration")]
    pub stats_window: Duration,
    /// Window for trend sparklines.
    #[serde(with = "serde_duration")]
    pub sparkline_window: Duration,
    pub sparkline_points: usize,
    /// Land GeoJSON to use instead of the bundled dataset.
    #[serde(default)]
    pub geojson: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: String,
    pub thresholds: StatusThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            probe_interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(4),
            probe_port: 443,
            stats_window: Duration::from_secs(60 * 60),
            sparkline_window: Duration::from_secs(30 * 60),
            sparkline_points: 50,
            geojson: None,
            log_file: PathBuf::from("laglens.log"),
            log_level: "info".to_string(),
            thresholds: StatusThresholds::default(),
        }
    }
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub probe_interval: Option<String>,
    pub probe_timeout: Option<String>,
    pub probe_port: Option<u16>,
    pub geojson: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// The subset of settings the coordinator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
}

impl MonitorSettings {
    /// Reject settings under which a round could overlap the next.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_interval.is_zero() {
            return Err(ConfigError::Zero("probe_interval"));
        }
        if self.probe_timeout >= self.probe_interval {
            return Err(ConfigError::TimeoutNotBelowInterval {
                timeout: self.probe_timeout,
                interval: self.probe_interval,
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, the process environment
    /// and command-line overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(path, overrides, None)
    }

    /// Like [`Settings::load`] but reads the environment layer from `env`
    /// when given instead of the process environment.
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("probe_interval", serde_duration::format(defaults.probe_interval))?
            .set_default("probe_timeout", serde_duration::format(defaults.probe_timeout))?
            .set_default("probe_port", i64::from(defaults.probe_port))?
            .set_default("stats_window", serde_duration::format(defaults.stats_window))?
            .set_default(
                "sparkline_window",
                serde_duration::format(defaults.sparkline_window),
            )?
            .set_default("sparkline_points", defaults.sparkline_points as i64)?
            .set_default("log_file", defaults.log_file.display().to_string())?
            .set_default("log_level", defaults.log_level)?
            .set_default("thresholds.degraded_ms", defaults.thresholds.degraded_ms)?
            .set_default("thresholds.down_ms", defaults.thresholds.down_ms)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder
            .add_source(
                Environment::with_prefix("LAGLENS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("probe_interval", overrides.probe_interval.clone())?
            .set_override_option("probe_timeout", overrides.probe_timeout.clone())?
            .set_override_option("probe_port", overrides.probe_port.map(i64::from))?
            .set_override_option(
                "geojson",
                overrides.geojson.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("log_level", overrides.log_level.clone())?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn monitor(&self) -> MonitorSettings {
        MonitorSettings {
            probe_interval: self.probe_interval,
            probe_timeout: self.probe_timeout,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.monitor().validate()?;
        if self.stats_window.is_zero() {
            return Err(ConfigError::Zero("stats_window"));
        }
        if self.sparkline_window.is_zero() {
            return Err(ConfigError::Zero("sparkline_window"));
        }
        if self.sparkline_points == 0 {
            return Err(ConfigError::Zero("sparkline_points"));
        }
        Ok(())
    }
}
