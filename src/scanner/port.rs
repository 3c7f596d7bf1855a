//! TCP port probing. Connect-based with semaphore-limited concurrency;
//! refusals, timeouts and socket errors all read as closed.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Concurrent connect scanner for a single host.
pub struct PortScanner {
    timeout: Duration,
    max_concurrent: usize,
}

impl PortScanner {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(300),
            max_concurrent: 10,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// A port is open iff the connect completes within the deadline.
    async fn probe_port(ip: IpAddr, port: u16, deadline: Duration) -> bool {
        let addr = SocketAddr::new(ip, port);
        matches!(timeout(deadline, TcpStream::connect(addr)).await, Ok(Ok(_)))
    }

    /// Probe `ports` on `ip`, returning the open set deduplicated and
    /// sorted ascending. Never errors; a fully closed host yields an empty
    /// vector.
    pub async fn scan_host(&self, ip: IpAddr, ports: &[u16]) -> Vec<u16> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        let mut handles = Vec::with_capacity(ports.len());

        for &port in ports {
            let sem = semaphore.clone();
            let deadline = self.timeout;

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                Self::probe_port(ip, port, deadline).await.then_some(port)
            }));
        }

        let mut open = Vec::new();
        for handle in handles {
            if let Ok(Some(port)) = handle.await {
                open.push(port);
            }
        }

        open.sort_unstable();
        open.dedup();
        open
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_scanner_defaults() {
        let scanner = PortScanner::default();
        assert_eq!(scanner.timeout, Duration::from_millis(300));
        assert_eq!(scanner.max_concurrent, 10);
    }

    #[test]
    fn test_scanner_builders() {
        let scanner = PortScanner::new()
            .with_timeout(Duration::from_millis(50))
            .with_concurrency(4);
        assert_eq!(scanner.timeout, Duration::from_millis(50));
        assert_eq!(scanner.max_concurrent, 4);
    }

    #[tokio::test]
    async fn test_scan_host_finds_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        // A second ephemeral port that nothing listens on
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let scanner = PortScanner::new();
        let ports = vec![closed_port, open_port, open_port];
        let open = scanner.scan_host("127.0.0.1".parse().unwrap(), &ports).await;

        assert_eq!(open, vec![open_port]);
    }

    #[tokio::test]
    async fn test_scan_host_all_closed_is_empty_not_error() {
        let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = reserved.local_addr().unwrap().port();
        drop(reserved);

        let scanner = PortScanner::new();
        let open = scanner.scan_host("127.0.0.1".parse().unwrap(), &[port]).await;
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_scan_host_sorts_ascending() {
        let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut expected = vec![
            first.local_addr().unwrap().port(),
            second.local_addr().unwrap().port(),
        ];
        let probe_order: Vec<u16> = expected.iter().rev().copied().collect();
        expected.sort_unstable();

        let scanner = PortScanner::new();
        let open = scanner
            .scan_host("127.0.0.1".parse().unwrap(), &probe_order)
            .await;
        assert_eq!(open, expected);
    }
}
