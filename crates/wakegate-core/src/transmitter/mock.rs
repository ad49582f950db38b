// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mock transmitter for testing.
//!
//! Records every delivery instead of touching the network.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::*;
use crate::magic_packet::MagicPacket;
use crate::resolver::WakeTarget;

/// Mock transmitter for testing.
pub struct MockTransmitter {
    deliveries: AtomicUsize,
    packets: Mutex<Vec<Vec<u8>>>,
    /// Number of leading deliveries that fail.
    pub fail_first: usize,
    /// If true, every delivery fails.
    pub fail_always: bool,
}

impl Default for MockTransmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransmitter {
    /// Create a transmitter whose deliveries always succeed.
    pub fn new() -> Self {
        Self {
            deliveries: AtomicUsize::new(0),
            packets: Mutex::new(Vec::new()),
            fail_first: 0,
            fail_always: false,
        }
    }

    /// Create a transmitter whose deliveries always fail.
    pub fn failing() -> Self {
        Self {
            fail_always: true,
            ..Self::new()
        }
    }

    /// Create a transmitter whose first `n` deliveries fail.
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::new()
        }
    }

    /// Number of `deliver` calls so far, successful or not.
    pub fn delivery_count(&self) -> usize {
        self.deliveries.load(Ordering::SeqCst)
    }

    /// Payloads of the successful deliveries.
    pub async fn sent_packets(&self) -> Vec<Vec<u8>> {
        self.packets.lock().await.clone()
    }
}

#[async_trait]
impl PacketSender for MockTransmitter {
    fn sender_type(&self) -> &'static str {
        "mock"
    }

    async fn deliver(&self, packet: &MagicPacket, target: &WakeTarget) -> Result<DeliveryReport> {
        let call = self.deliveries.fetch_add(1, Ordering::SeqCst);
        let destinations = target.destinations();

        if self.fail_always || call < self.fail_first {
            return Err(TransmitError::AllDestinationsFailed {
                attempts: destinations.len(),
                last_error: "Mock failure".to_string(),
            });
        }

        self.packets.lock().await.push(packet.as_bytes().to_vec());
        Ok(DeliveryReport {
            delivered: destinations.iter().map(|d| d.to_string()).collect(),
            failed: Vec::new(),
        })
    }
}
