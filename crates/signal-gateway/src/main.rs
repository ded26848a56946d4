//! Signaling server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p signal-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use signal_common::{AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let tracing_config = if config.app.env.is_production() {
        TracingConfig::production()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = signal_common::try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        addr = %config.gateway.address(),
        "Starting signaling server..."
    );

    // Run the server
    if let Err(e) = signal_gateway::server::run(config).await {
        error!(error = %e, "Signaling server failed");
        std::process::exit(1);
    }
}
