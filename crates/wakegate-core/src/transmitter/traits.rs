// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transmitter trait definitions.
//!
//! Defines the abstract interface for magic packet delivery.

use async_trait::async_trait;
use thiserror::Error;

use crate::magic_packet::MagicPacket;
use crate::resolver::WakeTarget;

/// Errors from packet delivery.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TransmitError {
    /// The target has no destination at all.
    #[error("No destinations to deliver to")]
    NoDestinations,

    /// Every destination failed.
    #[error("All {attempts} destinations failed, last error: {last_error}")]
    AllDestinationsFailed {
        /// Number of destinations tried.
        attempts: usize,
        /// Error of the last failed destination.
        last_error: String,
    },
}

/// Result type for transmitter operations.
pub type Result<T> = std::result::Result<T, TransmitError>;

/// Outcome of a delivery where at least one destination succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Destinations the payload was handed to.
    pub delivered: Vec<String>,
    /// Destinations that failed, with their error.
    pub failed: Vec<(String, String)>,
}

/// Trait for magic packet transmitters.
///
/// Transmitters are best-effort: a successful delivery only means the payload
/// left this host, never that the target woke up.
#[async_trait]
pub trait PacketSender: Send + Sync {
    /// Transmitter type identifier (e.g., "udp", "mock")
    fn sender_type(&self) -> &'static str;

    /// Deliver `packet` to every destination of `target`.
    ///
    /// Fails only when every destination fails.
    async fn deliver(&self, packet: &MagicPacket, target: &WakeTarget) -> Result<DeliveryReport>;
}
