//! The device record returned for every discovered host. Status and type
//! fields are derived from probe evidence at construction, never set
//! independently.

use std::net::IpAddr;

use serde::{Serialize, Serializer};

use super::classify::{classify_status, guess_device_type};

#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub ip: IpAddr,
    pub hostname: Option<String>,
    #[serde(rename = "latency", serialize_with = "round_one_decimal")]
    pub latency_ms: Option<f64>,
    pub mac_address: Option<String>,
    pub vendor: Option<String>,
    pub open_ports: Vec<u16>,
    pub status: &'static str,
    #[serde(rename = "statusColor")]
    pub status_color: &'static str,
    pub last_seen: i64,
    pub device_type: Option<&'static str>,
}

impl Device {
    /// Assemble a record from probe evidence, deriving status and device
    /// type and stamping the discovery time.
    pub fn from_probe(
        ip: IpAddr,
        hostname: Option<String>,
        latency_ms: Option<f64>,
        mac_address: Option<String>,
        vendor: Option<String>,
        open_ports: Vec<u16>,
    ) -> Self {
        let status = classify_status(latency_ms);
        let device_type = guess_device_type(hostname.as_deref(), mac_address.as_deref(), &open_ports);
        Self {
            ip,
            hostname,
            latency_ms,
            mac_address,
            vendor,
            open_ports,
            status: status.label,
            status_color: status.color,
            last_seen: chrono::Utc::now().timestamp(),
            device_type,
        }
    }
}

/// Latency is rounded to one decimal on the wire only; the in-memory value
/// stays exact.
fn round_one_decimal<S>(latency: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match latency {
        Some(ms) => serializer.serialize_some(&((ms * 10.0).round() / 10.0)),
        None => serializer.serialize_none(),
    }
}
