// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the rate limiter.
//!
//! Each `Metrics` instance owns its registry, so embedders running
//! several limiters (and parallel tests) never collide on metric names.

use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Limiter metrics. Clones share the same underlying collectors.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub allowed_total: IntCounter,
    pub rejected_total: IntCounter,
    pub store_size: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let allowed_total = IntCounter::with_opts(Opts::new(
            "ratelimit_allowed_total",
            "Requests allowed through the rate limiter",
        ))?;
        let rejected_total = IntCounter::with_opts(Opts::new(
            "ratelimit_rejected_total",
            "Requests rejected with 429",
        ))?;
        let store_size = IntGauge::with_opts(Opts::new(
            "ratelimit_store_size",
            "Resident records in the counting store",
        ))?;

        registry.register(Box::new(allowed_total.clone()))?;
        registry.register(Box::new(rejected_total.clone()))?;
        registry.register(Box::new(store_size.clone()))?;

        Ok(Self {
            registry,
            allowed_total,
            rejected_total,
            store_size,
        })
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
