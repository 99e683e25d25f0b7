//! Team Randomizer API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p randomizer-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use anyhow::Context;
use randomizer_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Configuration first so the tracing preset can follow the environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = ?e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        port = config.api.port,
        store = ?config.store.backend,
        "Starting Team Randomizer API Server..."
    );

    if let Err(e) = randomizer_api::run(config).await {
        if e.is_transient() {
            warn!(code = e.error_code(), "A dependency was unreachable; restarting may succeed");
        }
        return Err(e).context("server terminated");
    }
    Ok(())
}
