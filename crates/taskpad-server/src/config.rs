//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Public origin used to build shareable task links, e.g.
    /// `https://taskpad.example`.
    /// Env: `PUBLIC_URL`
    /// Default: unset — share links come out origin-less (malformed, not
    /// an error).
    pub public_url: Option<String>,

    /// Landing-page revalidation window in seconds: how long the aggregate
    /// task/comment counts are served from cache.
    /// Env: `REVALIDATE_SECS`
    /// Default: `3600`
    pub revalidate_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            public_url: None,
            revalidate_secs: 3600,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(url) = std::env::var("PUBLIC_URL") {
            if !url.is_empty() {
                config.public_url = Some(url);
            }
        }

        if let Ok(val) = std::env::var("REVALIDATE_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.revalidate_secs = secs;
            } else {
                tracing::warn!(value = %val, "Invalid REVALIDATE_SECS, using default");
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
