//! The tracker binary.
//!
//! Deliberately thin: it loads the TOML configuration (from the path in the
//! `SHOAL_TRACKER_CONFIG_TOML_PATH` environment variable, or the defaults
//! when unset), starts the application and waits for `ctrl-c`. Anything
//! smarter (argument parsing, daemonizing, service files) belongs to the
//! environment around the tracker, not in it.
//!
//! Exit codes: `78` for an unreadable or invalid configuration (the classic
//! `EX_CONFIG`), `2` for a startup failure such as a port already in use.
use std::path::Path;

use shoal_tracker::bootstrap::app;
use shoal_tracker_configuration::Configuration;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_ENV_VAR: &str = "SHOAL_TRACKER_CONFIG_TOML_PATH";

#[tokio::main]
async fn main() {
    let config = load_configuration();

    init_tracing(&config.logging.threshold);

    let running = match app::start(&config).await {
        Ok(running) => running,
        Err(error) => {
            tracing::error!(%error, "tracker failed to start");
            std::process::exit(2);
        }
    };

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for the shutdown signal");
    }

    tracing::info!("shutting down");
    running.shutdown().await;
}

fn load_configuration() -> Configuration {
    match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(path) => match Configuration::load_from_file(Path::new(&path)) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("{error}");
                std::process::exit(78);
            }
        },
        Err(_) => Configuration::default(),
    }
}

fn init_tracing(threshold: &str) {
    let filter = EnvFilter::try_new(threshold).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
