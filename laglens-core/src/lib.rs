//! # laglens-core
//!
//! Engine for the laglens latency monitor: per-host latency history with
//! windowed statistics, and an ASCII world map that places hosts on a
//! rasterized land/water grid.
//!
//! ## Modules
//!
//! - [`history`]: Append-only latency series and [`StatsSnapshot`] aggregation
//! - [`geo`]: Projection, geometry store, spatial index and [`MapRasterizer`]
//! - [`host`]: [`Host`] records and the [`HostRegistry`]
//! - [`status`]: Classification of latencies into [`LatencyStatus`] tiers
//!
//! ## Features
//!
//! - `serde` (default): Serialize snapshots, hosts and statuses
//!
//! ## Example
//!
//! ```rust
//! use laglens_core::{LatencyHistory, Marker, MapRasterizer, LatencyStatus};
//! use std::time::{Duration, SystemTime};
//!
//! let history = LatencyHistory::new();
//! let now = SystemTime::now();
//! history.record("eu-west-3", Some(40.0), now);
//! history.record("eu-west-3", None, now);
//! history.record("eu-west-3", Some(60.0), now);
//!
//! let stats = history.statistics_at("eu-west-3", Duration::from_secs(3600), now);
//! assert_eq!(stats.avg, Some(50.0));
//! assert_eq!(stats.jitter, Some(20.0));
//!
//! let map = MapRasterizer::bundled().unwrap();
//! let grid = map
//!     .render(80, 24, &[Marker::new(48.86, 2.29, LatencyStatus::Good)])
//!     .unwrap();
//! assert_eq!(grid.markers().len(), 1);
//! ```

pub mod error;
pub mod geo;
pub mod history;
pub mod host;
pub mod status;

pub use error::{GeometryLoadError, HostError, MapError};
pub use geo::{Grid, MapRasterizer, Marker};
pub use history::{LatencyHistory, Measurement, StatsSnapshot};
pub use host::{default_hosts, Host, HostRegistry};
pub use status::{LatencyStatus, StatusThresholds};
