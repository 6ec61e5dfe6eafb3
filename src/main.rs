/// Terrabaq - session gateway
use terrabaq::{config::ServerConfig, context::AppContext, error::GatewayResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> GatewayResult<()> {
    // Load configuration first so `.env` can set RUST_LOG
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(config.logging.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Terrabaq session gateway v{}", env!("CARGO_PKG_VERSION"));

    // Create application context
    let ctx = AppContext::new(config)?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
