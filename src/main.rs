use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use shopping_assistant::ShoppingAssistant;
use shopping_assistant::config::Config;
use shopping_assistant::server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopping_assistant=info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Arc::new(Config::load());

    let assistant = Arc::new(
        ShoppingAssistant::new(&config).context("Failed to initialize shopping assistant")?,
    );

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind '{}' (expected host:port)", config.server.bind))?;

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        name = %config.server.name,
        refine_model = %config.groq.refine_model,
        summary_model = %config.groq.summary_model,
        "Starting shopping assistant"
    );

    axum::serve(listener, server::router(assistant)).await?;
    Ok(())
}
