//! Best-effort auxiliary lookups for live hosts: reverse DNS behind a
//! bounded cache, neighbor-table MAC resolution, and OUI vendor mapping.
//! Every failure mode degrades to None.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Capacity-bounded LRU keyed by address. Negative lookups are cached too,
/// so repeat scans do not re-pay the timeout for silent hosts. No TTL;
/// entries live until evicted by capacity pressure.
struct LruCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<IpAddr, (Option<String>, u64)>,
}

impl LruCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, ip: &IpAddr) -> Option<Option<String>> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(ip).map(|entry| {
            entry.1 = tick;
            entry.0.clone()
        })
    }

    fn put(&mut self, ip: IpAddr, hostname: Option<String>) {
        self.tick += 1;
        self.entries.insert(ip, (hostname, self.tick));
        if self.entries.len() > self.capacity
            && let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (_, tick))| *tick)
                .map(|(ip, _)| *ip)
        {
            self.entries.remove(&oldest);
        }
    }
}

/// Reverse DNS resolution with a shared LRU cache, safe for concurrent use
/// from many probe tasks.
pub struct HostnameResolver {
    timeout: Duration,
    cache: Mutex<LruCache>,
}

impl HostnameResolver {
    pub fn new(timeout: Duration, cache_capacity: usize) -> Self {
        Self {
            timeout,
            cache: Mutex::new(LruCache::new(cache_capacity)),
        }
    }

    /// Resolve `ip` to a hostname. NXDOMAIN, timeouts and resolver errors
    /// all return None.
    pub async fn resolve(&self, ip: IpAddr) -> Option<String> {
        if let Ok(mut cache) = self.cache.lock()
            && let Some(cached) = cache.get(&ip)
        {
            return cached;
        }

        let lookup = tokio::task::spawn_blocking(move || {
            // Some resolvers hand the address back verbatim instead of
            // failing; that is not a hostname.
            dns_lookup::lookup_addr(&ip).ok().filter(|name| *name != ip.to_string())
        });
        let hostname = match timeout(self.timeout, lookup).await {
            Ok(Ok(name)) => name,
            _ => None,
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(ip, hostname.clone());
        }
        hostname
    }
}

/// Look up `ip` in the kernel neighbor table via `ip neigh`, falling back
/// to `arp -n`. Purely passive: no traffic is sent to populate the table,
/// so addresses never contacted before commonly miss.
pub async fn lookup_mac(ip: IpAddr) -> Option<String> {
    if let Some(mac) = neighbor_entry("ip", &["neigh", "show"], ip).await {
        return Some(mac);
    }
    neighbor_entry("arp", &["-n"], ip).await
}

async fn neighbor_entry(program: &str, args: &[&str], ip: IpAddr) -> Option<String> {
    let output = Command::new(program).args(args).arg(ip.to_string()).output();
    let output = match timeout(Duration::from_secs(1), output).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!(program, %ip, error = %e, "neighbor table query failed");
            return None;
        }
        Err(_) => return None,
    };
    if !output.status.success() {
        return None;
    }
    extract_mac(&String::from_utf8_lossy(&output.stdout))
}

/// First 6-octet colon-hex token in `text`, canonicalized to uppercase.
pub(crate) fn extract_mac(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| is_mac_token(token))
        .map(|token| token.to_ascii_uppercase())
}

fn is_mac_token(token: &str) -> bool {
    let mut groups = 0;
    for group in token.split(':') {
        if group.len() != 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }
        groups += 1;
    }
    groups == 6
}

/// Exact OUI match: the first three octets of `mac`, uppercased, against
/// the injected vendor table. No longest-prefix fallback.
pub fn lookup_vendor<'a>(mac: &str, table: &'a [(String, String)]) -> Option<&'a str> {
    let prefix = mac.get(..8)?.to_ascii_uppercase();
    table
        .iter()
        .find(|(oui, _)| *oui == prefix)
        .map(|(_, vendor)| vendor.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn vendor_table() -> Vec<(String, String)> {
        crate::config::Config::default().vendor_prefixes
    }

    #[test]
    fn test_extract_mac_from_ip_neigh_output() {
        let out = "192.168.1.7 dev eth0 lladdr dc:a6:32:aa:bb:cc REACHABLE\n";
        assert_eq!(extract_mac(out), Some("DC:A6:32:AA:BB:CC".to_string()));
    }

    #[test]
    fn test_extract_mac_from_arp_output() {
        let out = "Address     HWtype  HWaddress           Flags Mask  Iface\n\
                   192.168.1.7 ether   08:00:27:12:34:56   C           eth0\n";
        assert_eq!(extract_mac(out), Some("08:00:27:12:34:56".to_string()));
    }

    #[test]
    fn test_extract_mac_ignores_non_mac_tokens() {
        // IPv6 literals and short colon groups must not match
        assert_eq!(extract_mac("fe80::1 dev eth0 FAILED"), None);
        assert_eq!(extract_mac("192.168.1.7 (incomplete) eth0"), None);
        assert_eq!(extract_mac("aa:bb:cc:dd:ee"), None);
        assert_eq!(extract_mac("aa:bb:cc:dd:ee:ff:00"), None);
    }

    #[test]
    fn test_lookup_vendor_exact_prefix_only() {
        let table = vendor_table();
        assert_eq!(lookup_vendor("DC:A6:32:01:02:03", &table), Some("Raspberry Pi"));
        // Lowercase input canonicalizes
        assert_eq!(lookup_vendor("00:0c:29:99:99:99", &table), Some("VMware"));
        // Adjacent OUI does not fall back
        assert_eq!(lookup_vendor("DC:A6:33:01:02:03", &table), None);
        assert_eq!(lookup_vendor("DC:A6", &table), None);
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.put(ip("10.0.0.1"), Some("one".to_string()));
        cache.put(ip("10.0.0.2"), Some("two".to_string()));
        // Touch .1 so .2 becomes the eviction candidate
        assert_eq!(cache.get(&ip("10.0.0.1")), Some(Some("one".to_string())));
        cache.put(ip("10.0.0.3"), Some("three".to_string()));

        assert_eq!(cache.entries.len(), 2);
        assert!(cache.get(&ip("10.0.0.2")).is_none());
        assert_eq!(cache.get(&ip("10.0.0.1")), Some(Some("one".to_string())));
        assert_eq!(cache.get(&ip("10.0.0.3")), Some(Some("three".to_string())));
    }

    #[test]
    fn test_lru_caches_negative_results() {
        let mut cache = LruCache::new(4);
        cache.put(ip("10.0.0.9"), None);
        // A cached miss is Some(None): present, known-unresolved
        assert_eq!(cache.get(&ip("10.0.0.9")), Some(None));
        assert_eq!(cache.get(&ip("10.0.0.10")), None);
    }

    #[test]
    fn test_lru_capacity_bound_holds() {
        let mut cache = LruCache::new(3);
        for octet in 1..=50u8 {
            cache.put(ip(&format!("10.0.0.{octet}")), None);
        }
        assert_eq!(cache.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_resolver_serves_cached_value_without_lookup() {
        let resolver = HostnameResolver::new(Duration::from_millis(500), 16);
        let target = ip("198.51.100.23");
        if let Ok(mut cache) = resolver.cache.lock() {
            cache.put(target, Some("seeded.example".to_string()));
        }
        assert_eq!(resolver.resolve(target).await, Some("seeded.example".to_string()));
    }

    #[tokio::test]
    async fn test_resolver_concurrent_access_is_consistent() {
        let resolver = std::sync::Arc::new(HostnameResolver::new(Duration::from_millis(500), 16));
        let target = ip("198.51.100.24");
        if let Ok(mut cache) = resolver.cache.lock() {
            cache.put(target, Some("stable.example".to_string()));
        }

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move { resolver.resolve(target).await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some("stable.example".to_string()));
        }
    }
}
