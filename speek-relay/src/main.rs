use anyhow::{Context, Result};
use clap::Parser;
use speek_relay::{RelayConfig, RoomRelay, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log))
        .init();

    let relay = RoomRelay::new();
    let app = router(relay);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!("Relay listening on ws://{}/ws", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
