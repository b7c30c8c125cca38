// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-limiting middleware.
//!
//! Derives a limiter key from request identity (client IP + path),
//! consults the counting store, and translates the verdict into protocol
//! behavior: proceed with informational `X-RateLimit-*` headers, or
//! reject with HTTP 429 and a `Retry-After` hint.
//!
//! The limiter never propagates an error into the request pipeline; a
//! store failure degrades to "proceed" (fail open).

use crate::config::RateLimitConfig;
use crate::metrics::Metrics;
use crate::store::{RateLimitResult, RateLimitStore};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Error envelope for throttling and bad-request responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Outcome of evaluating one request against the limiter.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Let the request through. `remaining` is `None` when the limiter
    /// failed open and no usage information is available.
    Proceed { limit: u32, remaining: Option<u32> },
    /// Reject with 429 and a retry hint.
    Reject { retry_after: Duration },
}

/// Shared state for the axum middleware. Each mounted instance carries
/// its own policy, so routes can hold different quotas over one store.
#[derive(Clone)]
pub struct RateLimitState {
    pub store: RateLimitStore,
    pub config: RateLimitConfig,
    pub metrics: Metrics,
}

impl RateLimitState {
    pub fn new(store: RateLimitStore, config: RateLimitConfig, metrics: Metrics) -> Self {
        Self {
            store,
            config,
            metrics,
        }
    }
}

/// Client IP as reported by the nearest proxy hop.
///
/// Takes the first `x-forwarded-for` entry, then `x-real-ip`, then the
/// literal `"unknown"`. The first XFF entry is client-controlled;
/// validating it against a trusted-proxy list is a deployment policy
/// decision, not made here.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|value| value.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

/// Request path with query string and fragment excluded.
///
/// Accepts an absolute URL or a bare path.
pub fn request_path(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => raw
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(raw)
            .to_string(),
    }
}

/// Compose the limiter key from request identity.
pub fn limiter_key(ip: &str, method: &Method, path: &str, per_method: bool) -> String {
    if per_method {
        format!("{ip}:{method}:{path}")
    } else {
        format!("{ip}:{path}")
    }
}

/// Evaluate one request against the counting store.
pub async fn evaluate(
    store: &RateLimitStore,
    headers: &HeaderMap,
    method: &Method,
    path: &str,
    config: &RateLimitConfig,
) -> Decision {
    let ip = client_ip(headers);
    let key = limiter_key(&ip, method, path, config.per_method);

    match store.try_consume(&key, config.limit, config.window()).await {
        Ok(RateLimitResult::Allowed { remaining, .. }) => Decision::Proceed {
            limit: config.limit,
            remaining: Some(remaining),
        },
        Ok(RateLimitResult::Limited { retry_after }) => {
            info!(
                key = %key,
                ip = %ip,
                path = %path,
                limit = config.limit,
                window_ms = config.window_ms,
                retry_after_secs = retry_after_secs(retry_after),
                "request rate limited"
            );
            Decision::Reject { retry_after }
        }
        Err(err) => {
            error!(key = %key, error = %err, "store rejected limiter input, allowing request");
            Decision::Proceed {
                limit: config.limit,
                remaining: None,
            }
        }
    }
}

/// Axum middleware enforcing the per-IP-per-path quota.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let decision = evaluate(
        &state.store,
        request.headers(),
        request.method(),
        &path,
        &state.config,
    )
    .await;

    match decision {
        Decision::Proceed { limit, remaining } => {
            state.metrics.allowed_total.inc();
            let mut response = next.run(request).await;
            if let Some(remaining) = remaining {
                let headers = response.headers_mut();
                headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
                headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            }
            response
        }
        Decision::Reject { retry_after } => {
            state.metrics.rejected_total.inc();
            too_many_requests(retry_after)
        }
    }
}

/// Shape the throttling response: 429, `Retry-After`, JSON envelope.
pub fn too_many_requests(retry_after: Duration) -> Response {
    let secs = retry_after_secs(retry_after);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, secs.to_string())],
        Json(ErrorResponse {
            error: "Too many requests".to_string(),
            code: "RATE_LIMITED",
            retry_after_secs: Some(secs),
        }),
    )
        .into_response()
}

/// Seconds until the window resets, rounded up, never negative.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    (retry_after.as_millis() as u64).div_ceil(1000)
}
