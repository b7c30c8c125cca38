// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse pattern configurations.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client IPs to simulate
    pub unique_ips: usize,
    /// Number of unique request paths
    pub unique_paths: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            unique_paths: 1,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single IP flood - basic DoS against one endpoint.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Distributed flood - many IPs, few requests each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Path scan - one IP walking many endpoints.
    pub fn path_scan() -> Self {
        Self {
            total_requests: 60,
            unique_paths: 20,
            ..Default::default()
        }
    }

    /// Header rotation - one client spoofing a fresh XFF identity per
    /// burst.
    pub fn header_rotation() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 10,
            ..Default::default()
        }
    }
}
