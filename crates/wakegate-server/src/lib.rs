// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wakegate Server - HTTP Gate
//!
//! Sits in front of a service that may be asleep. Healthy requests are
//! forwarded upstream; unhealthy ones either trigger an inline wake
//! (autonomous mode) or are deflected to a control surface (interactive mode).
//!
//! # Routes (interactive mode)
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /control/wake` | Start a wake sequence |
//! | `POST /control/poweroff` | Signal shutdown |
//! | `GET /control/status` | Health and progress |
//! | `POST /control/redirect?path=/x` | Grant a bypass and redirect |
//! | `GET /control/config` | Control page settings |
//!
//! Everything else goes through the gate to the upstream forwarder.
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `WAKEGATE_UPSTREAM_URL` | Yes | - | Backend base URL |
//! | `WAKEGATE_LISTEN_PORT` | No | `8080` | HTTP listen port |
//!
//! Service settings (`WAKEGATE_HEALTH_CHECK`, `WAKEGATE_MAC_ADDRESS`, ...) are
//! documented on `wakegate_core::WakeConfig::from_env`.

#![deny(missing_docs)]

/// Gateway configuration loaded from environment variables.
pub mod config;

/// Placeholder page served while the service is down.
pub mod control_page;

/// Error types with HTTP status mapping.
pub mod error;

/// Gate middleware.
pub mod gate;

/// Control surface handlers and shared state.
pub mod handlers;

/// Embeddable runtime with graceful shutdown.
pub mod runtime;

/// Router assembly and server loop.
pub mod server;

/// Upstream request forwarding.
pub mod upstream;

pub use error::{Error, Result};
