//! Status and device-type classification. Pure functions over probe
//! evidence so every record can be recomputed from its own fields.

/// Latency bucket label plus the color the UI renders it with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMeta {
    pub label: &'static str,
    pub color: &'static str,
}

/// Bucket a round-trip latency. Absent latency means the host never
/// answered. Thresholds are inclusive-above: exactly 30.0 ms is "Good".
pub fn classify_status(latency_ms: Option<f64>) -> StatusMeta {
    let Some(ms) = latency_ms else {
        return StatusMeta { label: "Unreachable", color: "red" };
    };
    if ms < 30.0 {
        StatusMeta { label: "Excellent", color: "green" }
    } else if ms < 80.0 {
        StatusMeta { label: "Good", color: "lightgreen" }
    } else if ms < 150.0 {
        StatusMeta { label: "Fair", color: "yellow" }
    } else if ms < 300.0 {
        StatusMeta { label: "Poor", color: "orange" }
    } else {
        StatusMeta { label: "Critical", color: "red" }
    }
}

/// Coarse device-type guess from hostname, MAC and open-port evidence.
/// Rule order is significant: hostname checks first, then port heuristics,
/// first match wins. No evidence at all means no guess.
pub fn guess_device_type(
    hostname: Option<&str>,
    mac: Option<&str>,
    open_ports: &[u16],
) -> Option<&'static str> {
    if hostname.is_none() && mac.is_none() && open_ports.is_empty() {
        return None;
    }

    let host = hostname.map(str::to_lowercase).unwrap_or_default();
    if ["router", "gateway"].iter().any(|p| host.contains(p)) {
        return Some("Router");
    }
    if ["printer", "print"].iter().any(|p| host.contains(p)) {
        return Some("Printer");
    }
    if ["camera", "cam"].iter().any(|p| host.contains(p)) {
        return Some("Camera");
    }
    if open_ports.contains(&3389) {
        return Some("Windows");
    }
    if open_ports.contains(&22) && !open_ports.contains(&80) {
        return Some("Linux/Unix");
    }
    if open_ports.contains(&80) && open_ports.contains(&443) {
        return Some("Web Server");
    }
    Some("Unknown")
}
