//! Backend crate for the flight tracker service.
//!
//! Uses actix to serve the backend functionality: taking in an unordered list of flights and
//! working out where the whole trip starts and where it ends.

pub mod config;
pub mod middleware;
pub mod web_app;

use actix_web::{App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;
use crate::middleware::RequestLog;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.json_logs);

    let max_payload_bytes = config.max_payload_bytes;
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLog)
            .configure(web_app::configure(max_payload_bytes))
    })
    .client_request_timeout(config.request_timeout())
    .client_disconnect_timeout(config.request_timeout());

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!(
        host = %config.host,
        port = config.port,
        "starting flight tracker service"
    );

    server.bind(config.bind_addr())?.run().await
}

/// `RUST_LOG` wins over the built-in `info` default.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
