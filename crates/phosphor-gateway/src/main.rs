use anyhow::Result;
use clap::Parser;
use phosphor_gateway::{router, AppState, GatewayConfig, MemoryStore, OpenAiUpstream, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const SWEEP_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::parse();
    if config.api_key.is_empty() {
        warn!("no upstream API key set, every chat will fail upstream");
    }

    let store = Arc::new(MemoryStore::new());
    let sweeper = store.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_EVERY);
        loop {
            tick.tick().await;
            let dropped = sweeper.sweep();
            if dropped > 0 {
                debug!(dropped, "expired rate limit windows");
            }
        }
    });

    let limiter = Arc::new(RateLimiter::new(store, config.limit, config.window()));
    let assistant = Arc::new(OpenAiUpstream::from_config(&config)?);
    let app = router(AppState { limiter, assistant });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        model = %config.model,
        limit = config.limit,
        window_secs = config.window_secs,
        "gateway listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;
    Ok(())
}

async fn shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
