//! Scan orchestration. Expands a CIDR into probe targets, fans out
//! semaphore-bounded liveness probes, gathers evidence for live hosts, and
//! returns classified device records in ascending address order.

use std::net::IpAddr;
use std::sync::Arc;

use ipnetwork::Ipv4Network;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::Config;
use crate::network::device::Device;

use super::ScanError;
use super::lookup::{self, HostnameResolver};
use super::ping::LivenessProber;
use super::port::PortScanner;
use super::subnet::{self, Subnet};

/// Drives the probe primitives for whole-subnet scans and single-address
/// inspection. Cheap to clone; all state is shared behind `Arc`.
#[derive(Clone)]
pub struct ScanEngine {
    prober: Arc<dyn LivenessProber>,
    resolver: Arc<HostnameResolver>,
    config: Arc<Config>,
}

impl ScanEngine {
    pub fn new(prober: Arc<dyn LivenessProber>, config: Config) -> Self {
        let resolver = Arc::new(HostnameResolver::new(
            config.dns_timeout,
            config.dns_cache_capacity,
        ));
        Self {
            prober,
            resolver,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Candidate subnets for the local host, per the configured interface
    /// denylist.
    pub fn candidate_subnets(&self) -> Vec<Subnet> {
        subnet::candidate_subnets(&self.config.exclude_interfaces)
    }

    /// Scan every host address in `cidr` (network and broadcast excluded),
    /// truncated to `limit` in address order, with at most `workers`
    /// concurrent liveness probes. Port probing runs only when `deep` is
    /// set. Hosts that never answer contribute no record; the result is
    /// sorted ascending by address regardless of completion order.
    pub async fn scan_cidr(
        &self,
        cidr: &str,
        limit: usize,
        workers: usize,
        deep: bool,
    ) -> Result<Vec<Device>, ScanError> {
        let network: Ipv4Network = cidr
            .trim()
            .parse()
            .map_err(|_| ScanError::InvalidCidr(cidr.to_string()))?;

        let targets: Vec<IpAddr> = network
            .iter()
            .filter(|ip| *ip != network.network() && *ip != network.broadcast())
            .take(limit)
            .map(IpAddr::V4)
            .collect();
        debug!(cidr = %network, targets = targets.len(), deep, "starting scan");

        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut handles = Vec::with_capacity(targets.len());

        for ip in targets {
            let engine = self.clone();
            let sem = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                engine.probe_host(ip, deep).await
            }));
        }

        let mut devices = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(device)) => devices.push(device),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "probe task failed"),
            }
        }

        devices.sort_by_key(|device| device.ip);
        Ok(devices)
    }

    /// Single-address detail probe: the scan pipeline with deep scanning
    /// implied. None when the address does not answer the liveness probe.
    pub async fn inspect(&self, ip: IpAddr) -> Option<Device> {
        self.probe_host(ip, true).await
    }

    async fn probe_host(&self, ip: IpAddr, deep: bool) -> Option<Device> {
        let ping = self.prober.probe(ip).await;
        if !ping.alive {
            return None;
        }

        let hostname = self.resolver.resolve(ip).await;
        let mac = lookup::lookup_mac(ip).await;
        let vendor = mac
            .as_deref()
            .and_then(|mac| lookup::lookup_vendor(mac, &self.config.vendor_prefixes))
            .map(str::to_string);
        let open_ports = if deep {
            PortScanner::new()
                .with_timeout(self.config.port_timeout)
                .with_concurrency(self.config.port_workers)
                .scan_host(ip, &self.config.common_ports)
                .await
        } else {
            Vec::new()
        };

        Some(Device::from_probe(
            ip,
            hostname,
            ping.latency_ms,
            mac,
            vendor,
            open_ports,
        ))
    }
}
