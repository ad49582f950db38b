// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cached health verdicts.
//!
//! The monitor keeps the last verdict behind a read/write lock and serialises
//! refreshes through a separate gate:
//!
//! 1. Fast path: a fresh verdict is served under the read lock.
//! 2. Stale verdict: the caller that wins the gate re-checks freshness and
//!    probes. Everyone else keeps receiving the previous verdict until the
//!    refresh lands.
//! 3. No verdict yet: callers queue on the gate and re-check once it is
//!    theirs, so the first burst still triggers a single probe.
//!
//! Neither lock is held across a sleep. The gate is held across the probe
//! itself, the cache lock never is.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::probe::HealthProbe;

/// Last recorded health observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCacheEntry {
    /// Verdict served to callers.
    pub healthy: bool,
    /// Completion time of the probe that produced the verdict.
    pub last_checked_at: Option<Instant>,
    /// State last reported in the logs, used for transition detection.
    pub last_observed_state: Option<bool>,
}

impl HealthCacheEntry {
    fn fresh_verdict(&self, interval: Duration) -> Option<bool> {
        self.last_checked_at
            .filter(|checked| checked.elapsed() < interval)
            .map(|_| self.healthy)
    }
}

/// Health monitor with a time-bounded verdict cache.
pub struct HealthMonitor {
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
    cache: RwLock<HealthCacheEntry>,
    refresh: Mutex<()>,
}

impl HealthMonitor {
    /// Create a monitor whose verdicts stay fresh for `interval`.
    pub fn new(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        Self {
            probe,
            interval,
            cache: RwLock::new(HealthCacheEntry::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Freshness window of cached verdicts.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Copy of the current cache entry.
    pub async fn snapshot(&self) -> HealthCacheEntry {
        *self.cache.read().await
    }

    /// Probe the service now and record the observation.
    pub async fn probe(&self) -> bool {
        let healthy = self.probe.check().await;
        self.record(healthy, Instant::now()).await;
        healthy
    }

    /// Return a verdict no older than the freshness window, probing if needed.
    pub async fn cached_healthy(&self) -> bool {
        if let Some(healthy) = self.snapshot().await.fresh_verdict(self.interval) {
            return healthy;
        }

        let _refresh = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let entry = self.snapshot().await;
                if entry.last_checked_at.is_some() {
                    debug!(healthy = entry.healthy, "Refresh in flight, serving previous verdict");
                    return entry.healthy;
                }
                self.refresh.lock().await
            }
        };

        // Another caller may have refreshed while we waited for the gate.
        if let Some(healthy) = self.snapshot().await.fresh_verdict(self.interval) {
            return healthy;
        }

        self.probe().await
    }

    async fn record(&self, healthy: bool, checked_at: Instant) {
        let previous = {
            let mut entry = self.cache.write().await;
            if entry.last_checked_at.is_some_and(|last| last > checked_at) {
                return;
            }
            let previous = entry.last_observed_state;
            entry.healthy = healthy;
            entry.last_checked_at = Some(checked_at);
            entry.last_observed_state = Some(healthy);
            previous
        };

        match previous {
            None => info!(healthy, "Initial health state"),
            Some(was) if was != healthy => {
                if healthy {
                    info!("Service became healthy");
                } else {
                    warn!("Service became unhealthy");
                }
            }
            Some(_) => debug!(healthy, "Health unchanged"),
        }
    }
}
