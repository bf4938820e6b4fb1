//! # taskpad-server
//!
//! HTTP server for the task board: the landing page with aggregate
//! counts, the session-gated dashboard with its live feed, public task
//! pages with comment threads, and the auth cookie endpoints.

mod config;
mod error;
mod landing;
mod pages;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use taskpad_app::MemorySessions;
use taskpad_store::Store;

use crate::config::ServerConfig;
use crate::landing::StatsCache;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,taskpad_server=debug")),
        )
        .init();

    info!("Starting Taskpad server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    let store = Store::new();
    let sessions = Arc::new(MemorySessions::new());
    let stats = Arc::new(StatsCache::new(Duration::from_secs(config.revalidate_secs)));

    let state = AppState {
        store: store.clone(),
        sessions,
        stats: stats.clone(),
        config: Arc::new(config.clone()),
    };

    // Background revalidation keeps landing renders off the fetch path.
    let interval_secs = config.revalidate_secs.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            if let Err(err) = stats.refresh(&store).await {
                tracing::warn!(error = %err, "landing stats refresh failed");
            }
        }
    });

    tokio::select! {
        result = routes::serve(state, config.http_addr) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "HTTP server failed");
                return Err(err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
