// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wakegate Core - Service Lifecycle Engine
//!
//! This crate decides whether a sleeping backend is reachable, wakes it with
//! Wake-on-LAN magic packets when it is not, and coordinates wake and
//! power-off operations so that only one runs at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          wakegate-server                                 │
//! │              (gate middleware, control surface, forwarder)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//!           │                        │                          │
//!           ▼                        ▼                          ▼
//! ┌──────────────────┐   ┌───────────────────────┐   ┌─────────────────────┐
//! │  BypassSession   │   │     HealthMonitor     │◄──│      Lifecycle      │
//! │ (one-shot grant) │   │ (cached verdicts)     │   │ (wake / power-off)  │
//! └──────────────────┘   └───────────────────────┘   └─────────────────────┘
//!                                    │                          │
//!                                    ▼                          ▼
//!                          ┌───────────────────┐   ┌──────────────────────┐
//!                          │  HTTP readiness   │   │ PacketSender (UDP)   │
//!                          │  endpoint         │   │ → WakeTarget         │
//!                          └───────────────────┘   └──────────────────────┘
//! ```
//!
//! # Wake Sequence
//!
//! | Step | Progress | Description |
//! |------|----------|-------------|
//! | Deliver | 0-40% | Send the magic packet, spread across attempts |
//! | Delivered | 40-70% | Packet left the host |
//! | Poll | 70-95% | Probe readiness every 2s until the per-attempt timeout |
//! | Online | 100% | Service answered with 2xx |
//!
//! Delivery or readiness failures are retried up to `retry_attempts` times,
//! `retry_interval` apart. The final state is always `Idle`.
//!
//! # Configuration
//!
//! Configuration is loaded from `WAKEGATE_*` environment variables, see
//! [`config::WakeConfig::from_env`].
//!
//! # Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`magic_packet`]: Hardware address parsing and payload construction
//! - [`resolver`]: Broadcast discovery and wake target resolution
//! - [`transmitter`]: Packet delivery backends (UDP, mock)
//! - [`health`]: Readiness probes and the verdict cache
//! - [`bypass`]: Single-use post-wake bypass window
//! - [`lifecycle`]: Wake and power-off orchestration

#![deny(missing_docs)]

/// Single-use bypass window granted after a wake.
pub mod bypass;

/// Configuration loaded from environment variables.
pub mod config;

/// Error types for core operations.
pub mod error;

/// Readiness probes and cached health verdicts.
pub mod health;

/// Wake and power-off orchestration.
pub mod lifecycle;

/// Hardware address parsing and magic packet construction.
pub mod magic_packet;

/// Wake target resolution and broadcast discovery.
pub mod resolver;

/// Magic packet delivery backends.
pub mod transmitter;

pub use bypass::BypassSession;
pub use config::{ConfigError, WakeConfig};
pub use error::{Error, Result};
pub use health::{HealthMonitor, HealthProbe, HttpHealthProbe};
pub use lifecycle::{AdmissionError, Lifecycle, LifecycleConfig, OperationState, Phase};
pub use magic_packet::{MacAddress, MagicPacket, parse_hardware_address};
pub use resolver::WakeTarget;
pub use transmitter::{PacketSender, UdpTransmitter};
