//! fleetwatch server binary.
//!
//! Usage: `fleetwatch-server [config.yaml]`
//! - Device API and Prometheus metrics on two listeners
//! - Logging filtered by `RUST_LOG`

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use fleetwatch_server::{config, serve};

const DEFAULT_CONFIG: &str = "fleetwatch.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let arg = std::env::args().nth(1);
    let cfg = match arg.as_deref() {
        Some(path) => config::load_from_file(path),
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG),
        None => {
            tracing::warn!(path = DEFAULT_CONFIG, "config file not found, using defaults");
            Ok(config::ServiceConfig::default())
        }
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    match serve::run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fleetwatch-server terminated");
            ExitCode::FAILURE
        }
    }
}
