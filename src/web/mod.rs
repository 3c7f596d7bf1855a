pub mod api;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use tracing::info;

use crate::scanner::engine::ScanEngine;

/// Start the HTTP server fronting the scan engine. Runs until shutdown.
pub async fn start(engine: ScanEngine, host: &str, port: u16) -> std::io::Result<()> {
    info!(host, port, "starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(engine.clone()))
            .service(api::get_subnets)
            .service(api::scan_network)
            .service(api::get_device_detail)
            .service(api::health_check)
    })
    .bind((host, port))?
    .run()
    .await
}
