// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Security tests for the marketplace rate limiter.
//!
//! These tests replay abusive traffic patterns and validate that the
//! per-IP-per-path quotas hold where they should, and document where
//! they are known not to.

mod harness;

use axum::http::{HeaderMap, HeaderValue, Method};
use harness::{
    attacks::AttackConfig,
    generators,
    metrics::{AttackMetrics, Outcome},
};
use marketplace_rate_limiter::{
    config::RateLimitConfig,
    middleware::{evaluate, Decision},
    store::RateLimitStore,
};

/// Run an attack simulation against a fresh limiter.
async fn run_attack(config: &AttackConfig, rate_config: &RateLimitConfig) -> AttackMetrics {
    let store = RateLimitStore::default();
    let ips = generators::generate_ips(config.unique_ips);
    let paths = generators::generate_paths(config.unique_paths);

    let mut metrics = AttackMetrics::new();
    for i in 0..config.total_requests {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&ips[i % ips.len()]).unwrap(),
        );
        let path = &paths[i % paths.len()];

        match evaluate(&store, &headers, &Method::GET, path, rate_config).await {
            Decision::Proceed { .. } => metrics.record(Outcome::Allowed),
            Decision::Reject { .. } => metrics.record(Outcome::RateLimited),
        }
    }
    metrics
}

#[tokio::test]
async fn single_ip_flood_caps_at_the_limit() {
    let rate = RateLimitConfig {
        limit: 10,
        ..Default::default()
    };
    let metrics = run_attack(&AttackConfig::single_ip_flood(), &rate).await;
    println!("single_ip_flood: {}", metrics.summary());

    assert_eq!(metrics.count(Outcome::Allowed), 10);
    assert_eq!(metrics.count(Outcome::RateLimited), 190);
}

#[tokio::test]
async fn distributed_flood_under_per_ip_limits_passes() {
    // 500 requests spread over 100 IPs is 5 each, under the limit of 10.
    // Per-IP quotas deliberately do not defend against this; each IP
    // stays within its own budget.
    let rate = RateLimitConfig {
        limit: 10,
        ..Default::default()
    };
    let metrics = run_attack(&AttackConfig::distributed_flood(), &rate).await;
    println!("distributed_flood: {}", metrics.summary());

    assert_eq!(metrics.count(Outcome::Allowed), 500);
    assert_eq!(metrics.count(Outcome::RateLimited), 0);
}

#[tokio::test]
async fn path_scan_holds_independent_per_path_quotas() {
    // 60 requests over 20 paths is 3 per path; no path reaches its limit.
    let rate = RateLimitConfig {
        limit: 10,
        ..Default::default()
    };
    let metrics = run_attack(&AttackConfig::path_scan(), &rate).await;
    println!("path_scan: {}", metrics.summary());

    assert_eq!(metrics.count(Outcome::Allowed), 60);

    // Hammering a single path past its quota leaves the others intact.
    let focused = run_attack(
        &AttackConfig {
            total_requests: 15,
            ..Default::default()
        },
        &rate,
    )
    .await;
    assert_eq!(focused.count(Outcome::Allowed), 10);
    assert_eq!(focused.count(Outcome::RateLimited), 5);
}

#[tokio::test]
async fn xff_rotation_defeats_per_ip_quota() {
    // Known weakness: the first x-forwarded-for entry is
    // client-controlled, so a client rotating spoofed identities earns a
    // fresh quota per identity. Pinned here so a trusted-proxy fix has
    // to consciously change this assertion.
    let rate = RateLimitConfig {
        limit: 5,
        ..Default::default()
    };
    let metrics = run_attack(&AttackConfig::header_rotation(), &rate).await;
    println!("header_rotation: {}", metrics.summary());

    // 100 requests over 10 spoofed identities: 5 allowed each.
    assert_eq!(metrics.count(Outcome::Allowed), 50);
    assert_eq!(metrics.count(Outcome::RateLimited), 50);
}
