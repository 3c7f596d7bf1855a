//! Local subnet enumeration. Walks the interface table, filters out
//! administrative interfaces and non-IPv4 addresses, and derives candidate
//! CIDR blocks for scanning.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

use ipnetwork::Ipv4Network;
use pnet::datalink;
use serde::Serialize;

/// A candidate network for scanning, as reported to the API.
#[derive(Debug, Clone, Serialize)]
pub struct Subnet {
    pub iface: String,
    pub cidr: String,
    /// Network address + 1, the usual gateway position
    pub gateway_hint: String,
    /// Usable host count: total addresses minus network and broadcast,
    /// clamped at 0 for /31 and /32
    pub network_size: u64,
}

/// Enumerate IPv4 addresses of non-excluded local interfaces. An interface
/// table that cannot be read yields an empty vector, never an error.
pub fn list_local_ipv4s(exclude: &[String]) -> Vec<(String, Ipv4Addr, u8)> {
    datalink::interfaces()
        .into_iter()
        .filter(|iface| !exclude.iter().any(|prefix| iface.name.starts_with(prefix.as_str())))
        .flat_map(|iface| {
            let name = iface.name.clone();
            iface.ips.into_iter().filter_map(move |network| match network.ip() {
                IpAddr::V4(ip) => Some((name.clone(), ip, network.prefix())),
                IpAddr::V6(_) => None,
            })
        })
        .collect()
}

/// Candidate subnets for the local host: a normalized /24 plus the native
/// prefix for every enumerated address, deduplicated by (network, prefix)
/// in first-seen order.
pub fn candidate_subnets(exclude: &[String]) -> Vec<Subnet> {
    subnets_from_addrs(&list_local_ipv4s(exclude))
}

fn subnets_from_addrs(addrs: &[(String, Ipv4Addr, u8)]) -> Vec<Subnet> {
    let mut seen = HashSet::new();
    let mut subnets = Vec::new();

    for (iface, ip, native_prefix) in addrs {
        for prefix in [24, *native_prefix] {
            let Ok(network) = Ipv4Network::new(*ip, prefix) else {
                continue;
            };
            if !seen.insert((network.network(), network.prefix())) {
                continue;
            }
            subnets.push(Subnet {
                iface: iface.clone(),
                cidr: format!("{}/{}", network.network(), network.prefix()),
                gateway_hint: gateway_hint(&network).to_string(),
                network_size: usable_hosts(network.prefix()),
            });
        }
    }

    subnets
}

fn gateway_hint(network: &Ipv4Network) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(network.network()).saturating_add(1))
}

fn usable_hosts(prefix: u8) -> u64 {
    let total = 1u64 << (32 - u32::from(prefix).min(32));
    total.saturating_sub(2)
}
