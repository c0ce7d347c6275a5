use std::sync::Arc;

use anyhow::Context;
use config::AppConfig;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

mod config;
mod error;
mod handler;
mod platform;
mod resolver;
mod service;
mod state;
mod storage;
mod thumbnail;
mod utils;


fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    info!("Starting Recolekt API...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    // Environment writes happen here, before any worker thread exists.
    config.storage.export_credentials();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.addr();

    info!("Initializing AppState...");
    let state = Arc::new(AppState::new(config).context("Failed to initialize AppState")?);

    let app = handler::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
