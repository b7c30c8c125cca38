// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for rate limiter abuse simulation.
//!
//! Provides utilities for replaying abusive traffic patterns against
//! the limiter to validate its controls.

pub mod attacks;
pub mod generators;
pub mod metrics;
