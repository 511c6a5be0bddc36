//! `roomrelay` binary: reads the environment, serves WebSocket and health.

use roomrelay::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        ws = %config.ws_addr(),
        max_room_size = config.max_room_size,
        "starting roomrelay"
    );

    let server = RelayServerBuilder::from_config(&config)
        .build(DisplayNameAuthenticator)
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    }
}
