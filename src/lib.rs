// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Marketplace Rate Limiter
//!
//! Ingress-level rate limiting for the freelance marketplace API:
//!
//! - Per-IP, per-path quotas over a fixed window (10 req / 60 s default)
//! - Bounded in-memory counting store with periodic sweep and
//!   oldest-first eviction (10 000 record cap default)
//! - Axum middleware emitting HTTP 429 + `Retry-After` on rejection
//! - External `/check` verdict API for fronting proxies
//!
//! Quotas are process-local by design: horizontally scaled instances
//! each enforce their own budget, and a restart clears all counters.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod store;

pub use config::Config;
pub use middleware::{rate_limit_middleware, Decision, RateLimitState};
pub use store::{RateLimitResult, RateLimitStore, SweeperHandle};
