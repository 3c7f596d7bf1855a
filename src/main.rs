mod config;
mod network;
mod scanner;
mod web;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use scanner::engine::ScanEngine;
use scanner::ping::PingProber;

/// LAN discovery service: subnet-aware host scanning behind a JSON API.
#[derive(Parser, Debug)]
#[command(name = "lanprobe", version, about)]
struct Args {
    /// Address to bind the API server on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the API server on
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let prober = Arc::new(PingProber::new().with_timeout(config.ping_timeout));
    let engine = ScanEngine::new(prober, config);

    web::start(engine, &args.host, args.port).await
}
