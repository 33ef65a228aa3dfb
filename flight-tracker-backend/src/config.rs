//! Startup configuration for the flight tracker service.
//!
//! Everything is fixed once the process starts. Each flag also reads an environment variable
//! so containers can configure the service without touching the command line.

use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "flight-tracker",
    about = "Resolve the source and destination airports of an unordered flight itinerary",
    version
)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "FLIGHT_TRACKER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "FLIGHT_TRACKER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds a client gets to send its request, and to disconnect once answered.
    #[arg(
        long,
        env = "FLIGHT_TRACKER_REQUEST_TIMEOUT_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Largest request body accepted by `/calculate`, in bytes.
    #[arg(
        long,
        env = "FLIGHT_TRACKER_MAX_PAYLOAD_BYTES",
        default_value_t = 262_144,
        value_parser = parse_payload_limit
    )]
    pub max_payload_bytes: usize,

    /// Worker threads. Defaults to the number of physical CPUs.
    #[arg(
        long,
        env = "FLIGHT_TRACKER_WORKERS",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub workers: Option<usize>,

    /// Emit logs as JSON lines instead of human readable text.
    #[arg(long, env = "FLIGHT_TRACKER_JSON_LOGS")]
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse_payload_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("payload limit must be greater than zero".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}
