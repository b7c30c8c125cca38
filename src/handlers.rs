// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the rate limiter service.
//!
//! Besides the in-path middleware, the service answers rate-limit
//! verdicts for external callers: a fronting proxy posts request
//! identity to `/check` and reads the verdict from the body.

use crate::config::Config;
use crate::metrics::Metrics;
use crate::middleware::{request_path, retry_after_secs, ErrorResponse};
use crate::store::{RateLimitResult, RateLimitStore};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub store: RateLimitStore,
    pub config: Config,
    pub metrics: Metrics,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Rate limit check request (for external validation).
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub ip: String,
    pub path: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub window_ms: Option<u64>,
}

/// Rate limit check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "marketplace-rate-limiter",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Rate limit verdict for an external caller.
///
/// Returns 200 with the verdict in the body so the proxy can read it;
/// only malformed limiter arguments produce a non-200.
pub async fn check(State(state): State<Arc<AppState>>, Json(req): Json<CheckRequest>) -> Response {
    let ip = if req.ip.trim().is_empty() {
        "unknown".to_string()
    } else {
        req.ip.trim().to_string()
    };
    let path = request_path(&req.path);
    let key = format!("{ip}:{path}");
    let limit = req.limit.unwrap_or(state.config.rate_limit.limit);
    let window = req
        .window_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| state.config.rate_limit.window());

    debug!(
        key = %key,
        limit,
        window_ms = window.as_millis() as u64,
        "processing rate limit check"
    );

    match state.store.try_consume(&key, limit, window).await {
        Ok(RateLimitResult::Allowed { remaining, reset_in }) => {
            state.metrics.allowed_total.inc();
            (
                StatusCode::OK,
                Json(CheckResponse {
                    allowed: true,
                    remaining: Some(remaining),
                    retry_after_secs: None,
                    reset_at: reset_at(reset_in),
                }),
            )
                .into_response()
        }
        Ok(RateLimitResult::Limited { retry_after }) => {
            state.metrics.rejected_total.inc();
            info!(
                key = %key,
                ip = %ip,
                path = %path,
                limit,
                retry_after_secs = retry_after_secs(retry_after),
                "request rate limited"
            );
            (
                StatusCode::OK,
                Json(CheckResponse {
                    allowed: false,
                    remaining: None,
                    retry_after_secs: Some(retry_after_secs(retry_after)),
                    reset_at: reset_at(retry_after),
                }),
            )
                .into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
                code: "INVALID_ARGUMENT",
                retry_after_secs: None,
            }),
        )
            .into_response(),
    }
}

/// Wall-clock instant at which the key's window resets.
fn reset_at(reset_in: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(reset_in)
        .ok()
        .map(|delta| Utc::now() + delta)
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.store_size.set(state.store.len().await as i64);
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
