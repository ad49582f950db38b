// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! One-shot bypass window.
//!
//! After the service wakes, the control page redirects the browser back to
//! the original path. That request must not be gated again while the health
//! cache still holds the stale "unhealthy" verdict, so a redirect grants a
//! short window that lets exactly one request through.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// How long a granted bypass stays valid.
pub const BYPASS_WINDOW: Duration = Duration::from_secs(5);

/// State of the bypass window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BypassWindow {
    /// A grant is pending.
    pub active: bool,
    /// When the pending grant was issued.
    pub granted_at: Option<Instant>,
}

/// Single-use bypass session shared by the gate and the control surface.
#[derive(Debug)]
pub struct BypassSession {
    window: Mutex<BypassWindow>,
    validity: Duration,
}

impl Default for BypassSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BypassSession {
    /// Create a session with the standard window.
    pub fn new() -> Self {
        Self::with_validity(BYPASS_WINDOW)
    }

    /// Create a session with a custom window.
    pub fn with_validity(validity: Duration) -> Self {
        Self {
            window: Mutex::new(BypassWindow::default()),
            validity,
        }
    }

    /// Open (or re-open) the window.
    pub async fn grant(&self) {
        let mut window = self.window.lock().await;
        window.active = true;
        window.granted_at = Some(Instant::now());
        debug!(validity_secs = self.validity.as_secs(), "Bypass granted");
    }

    /// Consume the grant if one is pending and still valid.
    ///
    /// An expired grant is left untouched and reported as inactive.
    pub async fn consume_if_active(&self) -> bool {
        let mut window = self.window.lock().await;
        let valid = window.active
            && window
                .granted_at
                .is_some_and(|granted| granted.elapsed() < self.validity);
        if valid {
            *window = BypassWindow::default();
            debug!("Bypass consumed");
        }
        valid
    }

    /// Copy of the current window.
    pub async fn snapshot(&self) -> BypassWindow {
        *self.window.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_grant_is_single_use() {
        let session = BypassSession::new();
        assert!(!session.consume_if_active().await);

        session.grant().await;
        assert!(session.consume_if_active().await);
        assert!(!session.consume_if_active().await);
        assert!(!session.snapshot().await.active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_expires() {
        let session = BypassSession::new();
        session.grant().await;

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!session.consume_if_active().await);
        // Expired grants are not cleared, just ignored.
        assert!(session.snapshot().await.active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regrant_resets_window() {
        let session = BypassSession::new();
        session.grant().await;
        tokio::time::advance(Duration::from_secs(4)).await;
        session.grant().await;
        tokio::time::advance(Duration::from_secs(4)).await;

        assert!(session.consume_if_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_consumers_single_winner() {
        let session = std::sync::Arc::new(BypassSession::new());
        session.grant().await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.consume_if_active().await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
