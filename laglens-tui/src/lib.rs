// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # laglens-tui
//!
//! A live network latency monitor with an ASCII world map.
//!
//! A background coordinator probes every registered host once per interval
//! and appends the results to a shared [`LatencyHistory`](laglens_core::LatencyHistory).
//! The dashboard reads that history each frame to draw the map, the host
//! table and per-host trends.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//! │  │ monitor  │──▶│ history  │──▶│   app   │──▶│    ui     │  │
//! │  │ (rounds) │   │ (core)   │   │ (state) │   │ (ratatui) │  │
//! │  └────┬─────┘   └──────────┘   └────▲────┘   └───────────┘  │
//! │       │                             │                        │
//! │       ▼          watch channel      │                        │
//! │  ┌──────────┐   ────────────────────┘                        │
//! │  │  probe   │◀── TcpProber | any Prober                       │
//! │  └──────────┘                                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`monitor`]**: the [`Coordinator`] running probe rounds on a tokio interval
//! - **[`probe`]**: the [`Prober`] trait and its TCP connect implementation
//! - **[`app`]**: application state, view navigation, filter/sort, add-host form
//! - **[`ui`]**: terminal rendering (map, hosts table, detail, help)
//! - **[`config`]**: layered settings (defaults, file, `LAGLENS_*` env, CLI)
//! - **[`export`]**: JSON statistics snapshots
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor the default hosts
//! laglens
//!
//! # Faster rounds, custom hosts from a file
//! laglens --config laglens.toml --interval 2s --timeout 1500ms
//!
//! # Probe once and write statistics
//! laglens --export stats.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use laglens_core::{default_hosts, HostRegistry, LatencyHistory};
//! use laglens_tui::{Coordinator, Settings, TcpProber};
//! use parking_lot::RwLock;
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let registry = Arc::new(RwLock::new(HostRegistry::from_hosts(default_hosts())));
//! let history = Arc::new(LatencyHistory::new());
//! let coordinator = Coordinator::new(
//!     registry,
//!     history.clone(),
//!     Arc::new(TcpProber::new(settings.probe_port)),
//!     settings.monitor(),
//! )
//! .unwrap();
//!
//! let report = coordinator.run_round().await;
//! println!("{} of {} hosts failed", report.failures(), report.results.len());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod duration;
pub mod events;
pub mod export;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::{ConfigError, MonitorSettings, Overrides, Settings};
pub use monitor::{Coordinator, MonitorHandle, RoundReport};
pub use probe::{ProbeError, Prober, TcpProber};
