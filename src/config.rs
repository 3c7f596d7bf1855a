//! Runtime configuration. Tunables come from the environment; the static
//! lookup tables live here and reach the scanners by injection rather than
//! as module globals.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Interface name prefixes excluded from subnet enumeration: loopback,
/// container bridges, VPN/tunnel interfaces.
const EXCLUDE_INTERFACES: &[&str] = &[
    "lo", "docker", "br-", "veth", "virbr", "kube", "tailscale", "zt", "wg",
];

/// Well-known ports probed during deep scans.
const COMMON_PORTS: &[u16] = &[
    21, 22, 23, 25, 53, 80, 443, 445, 3306, 3389, 5432, 5900, 8080, 8443,
];

/// OUI prefix (uppercase colon-hex, first three octets) to vendor name.
/// Exact-match only; the table is illustrative, not an IEEE mirror.
const VENDOR_PREFIXES: &[(&str, &str)] = &[
    ("00:50:56", "VMware"),
    ("00:0C:29", "VMware"),
    ("08:00:27", "VirtualBox"),
    ("52:54:00", "QEMU/KVM"),
    ("DC:A6:32", "Raspberry Pi"),
    ("B8:27:EB", "Raspberry Pi"),
    ("E4:5F:01", "Raspberry Pi"),
    ("00:1B:44", "Apple"),
    ("28:CF:E9", "Apple"),
    ("3C:07:54", "Apple"),
    ("88:66:5A", "Apple"),
    ("00:50:F2", "Microsoft"),
    ("00:15:5D", "Microsoft"),
    ("28:18:78", "Google"),
    ("F4:F5:D8", "Google"),
];

/// Engine configuration, shared read-only by all scan invocations.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host-level concurrency bound per scan
    pub max_workers: usize,
    /// Deadline handed to the external ping utility
    pub ping_timeout: Duration,
    /// Per-port TCP connect deadline
    pub port_timeout: Duration,
    /// Reverse DNS lookup deadline
    pub dns_timeout: Duration,
    /// Port-level concurrency bound, applied freshly per host
    pub port_workers: usize,
    /// Capacity of the reverse DNS LRU cache
    pub dns_cache_capacity: usize,
    pub exclude_interfaces: Vec<String>,
    pub common_ports: Vec<u16>,
    pub vendor_prefixes: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 100,
            ping_timeout: Duration::from_secs(1),
            port_timeout: Duration::from_millis(300),
            dns_timeout: Duration::from_millis(500),
            port_workers: 10,
            dns_cache_capacity: 256,
            exclude_interfaces: EXCLUDE_INTERFACES.iter().map(|p| p.to_string()).collect(),
            common_ports: COMMON_PORTS.to_vec(),
            vendor_prefixes: VENDOR_PREFIXES
                .iter()
                .map(|(prefix, vendor)| (prefix.to_string(), vendor.to_string()))
                .collect(),
        }
    }
}

impl Config {
    /// Defaults overridden by `MAX_WORKERS`, `SCAN_TIMEOUT` and
    /// `PORT_TIMEOUT` (timeouts in seconds) when set and parseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(workers) = env_parse::<usize>("MAX_WORKERS") {
            config.max_workers = workers.max(1);
        }
        if let Some(secs) = env_parse::<f64>("SCAN_TIMEOUT")
            && secs > 0.0
        {
            config.ping_timeout = Duration::from_secs_f64(secs);
        }
        if let Some(secs) = env_parse::<f64>("PORT_TIMEOUT")
            && secs > 0.0
        {
            config.port_timeout = Duration::from_secs_f64(secs);
        }
        config
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}
