// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Synthetic request identity generators.

/// Generate `count` distinct client IPs in the 10.0.0.0/8 range.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff))
        .collect()
}

/// Generate `count` distinct marketplace API paths.
pub fn generate_paths(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("/jobs/{i}")).collect()
}
