pub mod engine;
pub mod lookup;
pub mod ping;
pub mod port;
pub mod subnet;

use thiserror::Error;

/// Result of a single liveness probe. A successful probe may still carry no
/// latency when the utility's output could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingResult {
    pub alive: bool,
    pub latency_ms: Option<f64>,
}

impl PingResult {
    pub fn up(latency_ms: Option<f64>) -> Self {
        Self { alive: true, latency_ms }
    }

    pub fn down() -> Self {
        Self { alive: false, latency_ms: None }
    }
}

/// Input errors surfaced to the boundary. Probe-level failures never become
/// errors; they degrade to absent fields or empty results.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),
}
