// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Health subsystem: readiness probing and verdict caching.

pub mod mock;
mod monitor;
mod probe;

pub use mock::ScriptedProbe;
pub use monitor::{HealthCacheEntry, HealthMonitor};
pub use probe::{DEFAULT_PROBE_TIMEOUT, HealthProbe, HttpHealthProbe};
