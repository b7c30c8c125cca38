// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window counting store for the request rate limiter.
//!
//! Tracks one record per limiter key and answers "is this key within
//! quota right now". Memory stays bounded: a periodic sweep removes
//! expired records, then evicts the oldest surplus once the store grows
//! past its configured bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Resident record bound applied when none is configured.
pub const DEFAULT_MAX_STORE_SIZE: usize = 10_000;

/// Malformed limiter input. These are programming errors, not runtime
/// failures; callers fail open on them instead of rejecting traffic.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid limiter argument: {0}")]
    InvalidArgument(&'static str),
}

/// Verdict for a single consumption attempt.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is within quota.
    Allowed {
        /// Requests left in the current window after this one.
        remaining: u32,
        /// Time until the window resets.
        reset_in: Duration,
    },
    /// Quota for this key is exhausted.
    Limited {
        /// Time until the window resets and requests are accepted again.
        retry_after: Duration,
    },
}

/// One quota bucket.
#[derive(Debug)]
struct RateLimitRecord {
    /// Requests observed in the current window.
    count: u32,
    /// When the window expires and the record becomes stale.
    window_reset: Instant,
    /// Creation time. Used only for eviction ordering, never for quota
    /// logic.
    first_seen: Instant,
}

/// Counters reported by one sweep pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// Records removed because their window had elapsed.
    pub expired: usize,
    /// Records evicted to get back under the store bound.
    pub evicted: usize,
    /// Records resident after the pass.
    pub resident: usize,
}

/// In-memory counting store. Clones share the same underlying map, so a
/// handle can be passed to the middleware and the sweeper alike.
#[derive(Clone)]
pub struct RateLimitStore {
    records: Arc<RwLock<HashMap<String, RateLimitRecord>>>,
    max_size: usize,
}

impl Default for RateLimitStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORE_SIZE)
    }
}

impl RateLimitStore {
    /// Create a store bounded to `max_size` resident records.
    pub fn new(max_size: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            max_size,
        }
    }

    /// Check-then-increment for `key` within a window of `window` length.
    ///
    /// A record whose window has elapsed is treated as absent and
    /// replaced with a fresh one, never incremented in place. The whole
    /// read-modify-write runs under one write guard with no suspension
    /// point inside, so requests for a key observe each other in arrival
    /// order.
    pub async fn try_consume(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitResult, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("empty key"));
        }
        if limit == 0 {
            return Err(StoreError::InvalidArgument("zero limit"));
        }
        if window.is_zero() {
            return Err(StoreError::InvalidArgument("zero window"));
        }

        let now = Instant::now();
        let mut records = self.records.write().await;

        match records.get_mut(key) {
            Some(record) if now < record.window_reset => {
                if record.count < limit {
                    record.count += 1;
                    Ok(RateLimitResult::Allowed {
                        remaining: limit - record.count,
                        reset_in: record.window_reset.saturating_duration_since(now),
                    })
                } else {
                    let retry_after = record.window_reset.saturating_duration_since(now);
                    debug!(
                        key,
                        count = record.count,
                        retry_after_ms = retry_after.as_millis() as u64,
                        "quota exhausted"
                    );
                    Ok(RateLimitResult::Limited { retry_after })
                }
            }
            // Absent or expired: start a fresh window.
            _ => {
                records.insert(
                    key.to_string(),
                    RateLimitRecord {
                        count: 1,
                        window_reset: now + window,
                        first_seen: now,
                    },
                );
                Ok(RateLimitResult::Allowed {
                    remaining: limit - 1,
                    reset_in: window,
                })
            }
        }
    }

    /// Remove every expired record, then evict oldest-first down to the
    /// store bound. Runs off the request path, on the sweeper's cadence.
    pub async fn sweep_expired(&self) -> SweepStats {
        let now = Instant::now();
        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|_, record| now < record.window_reset);
        let expired = before - records.len();

        let mut evicted = 0;
        if records.len() > self.max_size {
            let surplus = records.len() - self.max_size;
            let mut by_age: Vec<(Instant, String)> = records
                .iter()
                .map(|(key, record)| (record.first_seen, key.clone()))
                .collect();
            by_age.sort_by_key(|(first_seen, _)| *first_seen);
            for (_, key) in by_age.into_iter().take(surplus) {
                records.remove(&key);
            }
            evicted = surplus;
        }

        let stats = SweepStats {
            expired,
            evicted,
            resident: records.len(),
        };
        if stats.expired > 0 || stats.evicted > 0 {
            debug!(
                expired = stats.expired,
                evicted = stats.evicted,
                resident = stats.resident,
                "swept rate limit store"
            );
        }
        stats
    }

    /// Number of resident records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Spawn the background sweep task. The returned handle cancels the
    /// task when stopped or dropped; `interval` must be non-zero.
    pub fn start_sweeper(&self, interval: Duration) -> SweeperHandle {
        let store = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.sweep_expired().await;
            }
        });
        SweeperHandle { task }
    }
}

/// Owns the background sweep task for one store.
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Cancel the sweep task.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
