//! Probe scheduling.
//!
//! The [`Coordinator`] probes every registered host once per interval and
//! records one measurement per host per round into the shared
//! [`LatencyHistory`]. Each completed round is published on a watch channel
//! that the dashboard polls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use futures_util::future::join_all;
use laglens_core::status::duration_ms;
use laglens_core::{HostRegistry, LatencyHistory};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{ConfigError, MonitorSettings};
use crate::probe::{ProbeError, Prober};

/// Outcome of one probe round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// Sequential round number, starting at 1.
    pub round: u64,
    /// Timestamp recorded for every measurement in the round.
    pub started_at: SystemTime,
    /// Host name and latency in ms, `None` on failure. Registry order.
    pub results: Vec<(String, Option<f64>)>,
}

impl RoundReport {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_none()).count()
    }

    pub fn latency_of(&self, host: &str) -> Option<Option<f64>> {
        self.results
            .iter()
            .find(|(name, _)| name == host)
            .map(|(_, l)| *l)
    }
}

/// Latest round published by a running coordinator. `None` until the first
/// round completes.
pub type ReportReceiver = watch::Receiver<Option<Arc<RoundReport>>>;

/// Handle to a coordinator running in the background.
#[derive(Debug)]
pub struct MonitorHandle {
    pub task: JoinHandle<()>,
    pub reports: ReportReceiver,
}

pub struct Coordinator {
    registry: Arc<RwLock<HostRegistry>>,
    history: Arc<LatencyHistory>,
    prober: Arc<dyn Prober>,
    settings: MonitorSettings,
    rounds: AtomicU64,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("settings", &self.settings)
            .field("rounds", &self.rounds.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Create a coordinator. Fails if the timeout does not fit in the interval.
    pub fn new(
        registry: Arc<RwLock<HostRegistry>>,
        history: Arc<LatencyHistory>,
        prober: Arc<dyn Prober>,
        settings: MonitorSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            registry,
            history,
            prober,
            settings,
            rounds: AtomicU64::new(0),
        })
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    /// Probe every host once, concurrently, and record the results.
    ///
    /// The host list is read at the start of the round; hosts added while the
    /// round runs are picked up by the next one.
    pub async fn run_round(&self) -> RoundReport {
        let hosts = self.registry.read().list().to_vec();
        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        let started_at = SystemTime::now();
        let clock = Instant::now();
        let timeout = self.settings.probe_timeout;

        let tasks = hosts.iter().map(|host| {
            let prober = self.prober.clone();
            let address = host.address.clone();
            tokio::spawn(async move {
                match tokio::time::timeout(timeout, prober.probe(&address, timeout)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProbeError::Timeout { address, timeout }),
                }
            })
        });
        let outcomes = join_all(tasks).await;

        let mut results = Vec::with_capacity(hosts.len());
        for (host, outcome) in hosts.iter().zip(outcomes) {
            let latency = match outcome {
                Ok(Ok(rtt)) => Some(duration_ms(rtt)),
                Ok(Err(e)) => {
                    tracing::debug!(host = %host.name, error = %e, "probe failed");
                    None
                }
                Err(e) => {
                    tracing::warn!(host = %host.name, error = %e, "probe task aborted");
                    None
                }
            };
            self.history.record(&host.name, latency, started_at);
            results.push((host.name.clone(), latency));
        }

        let report = RoundReport {
            round,
            started_at,
            results,
        };
        tracing::info!(
            round,
            hosts = report.results.len(),
            failures = report.failures(),
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "probe round complete"
        );
        report
    }

    /// Run rounds now and then every interval until `shutdown` becomes true.
    ///
    /// A round still in flight at shutdown is abandoned without recording.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> MonitorHandle {
        let (report_tx, reports) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(self.settings.probe_interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        tokio::select! {
                            report = self.run_round() => {
                                report_tx.send_replace(Some(Arc::new(report)));
                            }
                            _ = shutdown.wait_for(|stop| *stop) => break,
                        }
                    }
                    changed = shutdown.changed() => {
                        // A dropped sender also stops the loop
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("coordinator stopped");
        });

        MonitorHandle { task, reports }
    }
}
