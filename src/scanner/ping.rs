//! Liveness probing via the system ping utility. One echo request per
//! probe; every failure mode collapses to a `down` result so a single dead
//! host can never abort a sweep.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::PingResult;

/// Capability seam for liveness probing. The production implementation
/// shells out to `ping`; tests inject canned responses so orchestration can
/// run without network access.
#[async_trait]
pub trait LivenessProber: Send + Sync {
    async fn probe(&self, ip: IpAddr) -> PingResult;
}

/// Probes by spawning `ping -c 1 -W <secs>` and parsing its output.
pub struct PingProber {
    timeout: Duration,
}

impl PingProber {
    pub fn new() -> Self {
        Self { timeout: Duration::from_secs(1) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessProber for PingProber {
    async fn probe(&self, ip: IpAddr) -> PingResult {
        let wait_secs = self.timeout.as_secs().max(1);
        let output = Command::new("ping")
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(wait_secs.to_string())
            .arg(ip.to_string())
            .kill_on_drop(true)
            .output();

        // One extra second on top of ping's own deadline covers spawn
        // overhead before the kill switch trips.
        let output = match timeout(self.timeout + Duration::from_secs(1), output).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(%ip, error = %e, "ping invocation failed");
                return PingResult::down();
            }
            Err(_) => return PingResult::down(),
        };

        if !output.status.success() {
            return PingResult::down();
        }

        let latency = parse_latency(&String::from_utf8_lossy(&output.stdout))
            .or_else(|| parse_latency(&String::from_utf8_lossy(&output.stderr)));
        PingResult::up(latency)
    }
}

/// Extract round-trip latency from ping output: the first case-insensitive
/// `time=<number> ms` (or `time<<number> ms`) token. A parse miss returns
/// None rather than failing the probe.
pub(crate) fn parse_latency(output: &str) -> Option<f64> {
    let lower = output.to_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("time") {
        rest = &rest[pos + 4..];
        let mut chars = rest.chars();
        if !matches!(chars.next(), Some('=') | Some('<')) {
            continue;
        }
        let value = &rest[1..];
        let digits: usize = value
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .map(char::len_utf8)
            .sum();
        if digits == 0 || !value[digits..].trim_start().starts_with("ms") {
            continue;
        }
        if let Ok(ms) = value[..digits].parse::<f64>() {
            return Some(ms);
        }
    }
    None
}

#[cfg(test)]
pub(crate) use canned::CannedProber;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latency_linux_format() {
        let output = "64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=12.4 ms";
        assert_eq!(parse_latency(output), Some(12.4));
    }

    #[test]
    fn test_parse_latency_sub_millisecond() {
        assert_eq!(parse_latency("time<1 ms"), Some(1.0));
        assert_eq!(parse_latency("time=0.043 ms"), Some(0.043));
    }

    #[test]
    fn test_parse_latency_case_insensitive() {
        assert_eq!(parse_latency("Reply from 10.0.0.1: TIME=3ms TTL=128"), Some(3.0));
    }

    #[test]
    fn test_parse_latency_skips_non_matching_tokens() {
        // A "time" word without the token shape must not stop the scan
        let output = "round-trip times follow\ntime=8.1 ms";
        assert_eq!(parse_latency(output), Some(8.1));
    }

    #[test]
    fn test_parse_latency_miss() {
        assert_eq!(parse_latency(""), None);
        assert_eq!(parse_latency("1 packets transmitted, 1 received"), None);
        assert_eq!(parse_latency("time="), None);
        assert_eq!(parse_latency("time=abc ms"), None);
    }

    #[tokio::test]
    async fn test_canned_prober_defaults_down() {
        let prober = CannedProber::new().up("10.0.0.1", 5.0);
        let up = prober.probe("10.0.0.1".parse().unwrap()).await;
        assert!(up.alive);
        assert_eq!(up.latency_ms, Some(5.0));

        let down = prober.probe("10.0.0.2".parse().unwrap()).await;
        assert!(!down.alive);
        assert_eq!(down.latency_ms, None);
    }

    #[tokio::test]
    async fn test_canned_prober_up_without_latency() {
        let prober = CannedProber::new().up_without_latency("10.0.0.3");
        let result = prober.probe("10.0.0.3".parse().unwrap()).await;
        assert!(result.alive);
        assert_eq!(result.latency_ms, None);
    }
}
