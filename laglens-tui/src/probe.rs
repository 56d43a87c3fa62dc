//! Latency probes.
//!
//! A [`Prober`] measures one round-trip to an address. The coordinator owns
//! scheduling and timeouts; a prober only has to report a duration or fail.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::{lookup_host, TcpStream};

/// Why a probe produced no measurement.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The address did not resolve to any socket address.
    #[error("Failed to resolve {address}: {message}")]
    Resolve { address: String, message: String },

    /// The connection was refused or reset.
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// No answer within the allowed time.
    #[error("Probe to {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },
}

/// Something that can measure latency to an address.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Measure one round-trip to `address`, giving up after `timeout`.
    async fn probe(&self, address: &str, timeout: Duration) -> Result<Duration, ProbeError>;
}

/// Times a TCP handshake to `address:port`.
///
/// The connection is dropped as soon as it is established.
#[derive(Debug, Clone)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub const DEFAULT_PORT: u16 = 443;

    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PORT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str, timeout: Duration) -> Result<Duration, ProbeError> {
        let attempt = async {
            let target = lookup_host((address, self.port))
                .await
                .map_err(|e| ProbeError::Resolve {
                    address: address.to_string(),
                    message: e.to_string(),
                })?
                .next()
                .ok_or_else(|| ProbeError::Resolve {
                    address: address.to_string(),
                    message: "no addresses returned".to_string(),
                })?;

            let start = Instant::now();
            let stream = TcpStream::connect(target)
                .await
                .map_err(|source| ProbeError::Connect {
                    address: address.to_string(),
                    source,
                })?;
            let elapsed = start.elapsed();
            drop(stream);
            Ok::<_, ProbeError>(elapsed)
        };

        tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| ProbeError::Timeout {
                address: address.to_string(),
                timeout,
            })?
    }
}
