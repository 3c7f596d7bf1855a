//! JSON handlers for the `/api/*` endpoints. The boundary validates input,
//! resolves the default scan target, and times scans; everything else is
//! the engine's job.

use std::net::IpAddr;
use std::time::Instant;

use actix_web::web::{Data, Path, Query};
use actix_web::{HttpResponse, Responder, get};
use serde::Deserialize;
use tracing::{info, warn};

use crate::scanner::engine::ScanEngine;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_CIDR: &str = "192.168.1.0/24";
const DEFAULT_HOST_LIMIT: usize = 254;

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    cidr: Option<String>,
    #[serde(default)]
    deep: bool,
    limit: Option<usize>,
}

#[get("/api/subnets")]
pub async fn get_subnets(engine: Data<ScanEngine>) -> impl Responder {
    let subnets = engine.candidate_subnets();
    info!(count = subnets.len(), "enumerated candidate subnets");
    HttpResponse::Ok().json(serde_json::json!({ "subnets": subnets }))
}

#[get("/api/scan")]
pub async fn scan_network(engine: Data<ScanEngine>, query: Query<ScanQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_HOST_LIMIT);
    let cidr = match &query.cidr {
        Some(cidr) => cidr.clone(),
        None => engine
            .candidate_subnets()
            .first()
            .map(|subnet| subnet.cidr.clone())
            .unwrap_or_else(|| DEFAULT_CIDR.to_string()),
    };

    info!(%cidr, deep = query.deep, limit, "scan requested");
    let started = Instant::now();
    match engine
        .scan_cidr(&cidr, limit, engine.config().max_workers, query.deep)
        .await
    {
        Ok(devices) => {
            let scan_time = started.elapsed().as_secs_f64();
            info!(found = devices.len(), elapsed_secs = scan_time, "scan complete");
            HttpResponse::Ok().json(serde_json::json!({
                "cidr": cidr,
                "count": devices.len(),
                "scan_time": (scan_time * 100.0).round() / 100.0,
                "devices": devices,
            }))
        }
        Err(e) => {
            warn!(error = %e, "scan rejected");
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

#[get("/api/device/{ip}")]
pub async fn get_device_detail(engine: Data<ScanEngine>, path: Path<String>) -> impl Responder {
    let Ok(ip) = path.parse::<IpAddr>() else {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Invalid IP address" }));
    };

    match engine.inspect(ip).await {
        Some(device) => HttpResponse::Ok().json(device),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "Device unreachable" })),
    }
}

#[get("/api/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "version": VERSION,
    }))
}
