// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Scripted probe for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::probe::HealthProbe;

/// Probe that replays a fixed sequence of verdicts.
///
/// Once the script runs out, the last verdict repeats (unhealthy for an empty
/// script).
pub struct ScriptedProbe {
    script: Mutex<VecDeque<bool>>,
    last: Mutex<bool>,
    calls: AtomicUsize,
    /// Simulated probe latency.
    pub delay: Option<Duration>,
}

impl ScriptedProbe {
    /// Replay `verdicts` in order.
    pub fn new(verdicts: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: Mutex::new(verdicts.into_iter().collect()),
            last: Mutex::new(false),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Always answer `healthy`.
    pub fn always(healthy: bool) -> Self {
        Self::new([healthy])
    }

    /// Add simulated latency to every check.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the remaining script with a constant verdict.
    pub async fn set_healthy(&self, healthy: bool) {
        self.script.lock().await.clear();
        *self.last.lock().await = healthy;
    }

    /// Number of checks performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn check(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().await.pop_front();
        let mut last = self.last.lock().await;
        if let Some(verdict) = next {
            *last = verdict;
        }
        *last
    }
}
