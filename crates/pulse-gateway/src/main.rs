//! Gateway server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p pulse-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use pulse_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Config comes first: the tracing format depends on the environment
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

    info!(
        env = ?config.app.env,
        port = config.server.port,
        "Configuration loaded"
    );

    if let Err(e) = pulse_gateway::run(config).await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}
