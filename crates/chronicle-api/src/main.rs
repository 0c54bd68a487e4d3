//! Chronicle API server entry point.

use std::sync::Arc;

use chronicle_api::config::Config;
use chronicle_api::error::AppError;
use chronicle_core::clock::SystemClock;
use chronicle_core::ids::RandomIds;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Chronicle API server");

    let config = Config::from_env()?;
    let state =
        chronicle_api::build_state(&config, Arc::new(SystemClock), Arc::new(RandomIds)).await?;
    let app = chronicle_api::router(state, config.cors_layer()?);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
