// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Health cache concurrency tests.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use wakegate_core::health::{HealthMonitor, ScriptedProbe};

const INTERVAL: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn test_first_burst_issues_single_probe() {
    let probe = Arc::new(ScriptedProbe::always(true).with_delay(Duration::from_millis(500)));
    let monitor = Arc::new(HealthMonitor::new(probe.clone(), INTERVAL));

    let results = join_all((0..32).map(|_| {
        let monitor = monitor.clone();
        async move { monitor.cached_healthy().await }
    }))
    .await;

    assert!(results.iter().all(|healthy| *healthy));
    assert_eq!(probe.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_callers_share_one_probe() {
    let probe = Arc::new(ScriptedProbe::always(false).with_delay(Duration::from_millis(500)));
    let monitor = Arc::new(HealthMonitor::new(probe.clone(), INTERVAL));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.cached_healthy().await })
        })
        .collect();

    for handle in handles {
        assert!(!handle.await.unwrap());
    }
    assert_eq!(probe.call_count(), 1);

    // Still within the interval: no further probes.
    tokio::time::advance(Duration::from_secs(3)).await;
    for _ in 0..10 {
        assert!(!monitor.cached_healthy().await);
    }
    assert_eq!(probe.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_verdict_served_during_refresh() {
    let probe = Arc::new(ScriptedProbe::new([true, false]).with_delay(Duration::from_secs(1)));
    let monitor = Arc::new(HealthMonitor::new(probe.clone(), INTERVAL));

    assert!(monitor.cached_healthy().await);
    tokio::time::advance(INTERVAL + Duration::from_secs(1)).await;

    let refresher = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.cached_healthy().await })
    };
    // Let the refresher take the gate and start probing.
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    // The refresh is in flight: the previous verdict is returned immediately.
    assert!(monitor.cached_healthy().await);
    assert_eq!(probe.call_count(), 2);

    assert!(!refresher.await.unwrap());
    assert!(!monitor.cached_healthy().await);
    assert_eq!(probe.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transitions_tracked() {
    let probe = Arc::new(ScriptedProbe::new([false, false, true, true, false]));
    let monitor = HealthMonitor::new(probe.clone(), INTERVAL);

    let observed: Vec<bool> = {
        let mut observed = Vec::new();
        for _ in 0..5 {
            observed.push(monitor.probe().await);
        }
        observed
    };

    assert_eq!(observed, vec![false, false, true, true, false]);
    let entry = monitor.snapshot().await;
    assert!(!entry.healthy);
    assert_eq!(entry.last_observed_state, Some(false));
}
