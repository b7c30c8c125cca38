// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Marketplace Rate Limiter Service
//!
//! Ingress rate limiting for the freelance marketplace API: per-IP,
//! per-path quotas over a fixed window, backed by a bounded in-memory
//! counting store.
//!
//! ## Usage
//!
//! The limiter provides two modes of operation:
//!
//! 1. **External check service**: a fronting proxy posts request
//!    identity to `/check` and reads the verdict from the body.
//!
//! 2. **Embedded middleware**: the marketplace app mounts
//!    `rate_limit_middleware` in front of its routes; throttled clients
//!    receive HTTP 429 with a `Retry-After` hint.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT`: Max requests per window per key (default: 10)
//! - `RATE_WINDOW_MS`: Window length in milliseconds (default: 60000)
//! - `MAX_STORE_SIZE`: Resident record bound (default: 10000)
//! - `SWEEP_INTERVAL_MS`: Sweep cadence in milliseconds (default: 60000)

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketplace_rate_limiter::{
    config::{Config, RateLimitConfig, StoreConfig},
    handlers::{self, AppState},
    metrics::Metrics,
    middleware::{rate_limit_middleware, RateLimitState},
    store::RateLimitStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        limit = config.rate_limit.limit,
        window_ms = config.rate_limit.window_ms,
        max_store_size = config.store.max_store_size,
        sweep_interval_ms = config.store.sweep_interval_ms,
        "Starting marketplace rate limiter"
    );

    // Create application state
    let store = RateLimitStore::new(config.store.max_store_size);
    let metrics = Metrics::new()?;
    let sweeper = store.start_sweeper(config.store.sweep_interval());

    let limiter_state = RateLimitState::new(
        store.clone(),
        config.rate_limit.clone(),
        metrics.clone(),
    );
    let state = Arc::new(AppState {
        store,
        config: config.clone(),
        metrics,
    });

    // Build router; the check API sits behind its own limiter instance
    let check_routes = Router::new()
        .route("/check", post(handlers::check))
        .route_layer(from_fn_with_state(limiter_state, rate_limit_middleware));

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health))
        .merge(check_routes);
    if config.metrics.enabled {
        app = app.route(&config.metrics.path, get(handlers::metrics));
    }
    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            limit: std::env::var("RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            window_ms: std::env::var("RATE_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            ..Default::default()
        },
        store: StoreConfig {
            max_store_size: std::env::var("MAX_STORE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            sweep_interval_ms: std::env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
        },
        ..Default::default()
    }
}
