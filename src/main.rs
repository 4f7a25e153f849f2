//! fanout-relay server entry point.
//!
//! Starts the producer and consumer WebSocket listeners and the HTTP
//! server, then runs until interrupted.

use tracing_subscriber::EnvFilter;

use fanout_relay::config::RelayConfig;
use fanout_relay::server::{RelayServer, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(domain = %config.domain, "starting fanout-relay");

    // Bind listeners
    let server = RelayServer::bind(config).await?;
    let addrs = server.addrs();
    tracing::info!(
        game_port = addrs.game.port(),
        web_port = addrs.web.port(),
        ws_port = addrs.ws.port(),
        "relay started"
    );

    server.run(shutdown_signal()).await?;

    tracing::info!("relay stopped");
    Ok(())
}
