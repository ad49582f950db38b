// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! UDP transmitter.
//!
//! Sends the payload to the unicast address (if any) and then to every
//! broadcast address, each over a fresh socket. Partial failures are logged
//! and reported; only a total failure is an error.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use super::traits::*;
use crate::magic_packet::MagicPacket;
use crate::resolver::WakeTarget;

/// Delivers magic packets over UDP.
#[derive(Debug, Clone)]
pub struct UdpTransmitter {
    bind_addr: SocketAddr,
}

impl Default for UdpTransmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl UdpTransmitter {
    /// Create a transmitter bound to an ephemeral port on all interfaces.
    pub fn new() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        }
    }

    /// Bind outgoing sockets to a specific local address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    async fn send_one(&self, packet: &MagicPacket, destination: &str, port: u16) -> io::Result<()> {
        let socket = UdpSocket::bind(self.bind_addr).await?;
        socket.set_broadcast(true)?;

        let payload = packet.as_bytes();
        let sent = socket.send_to(payload, (destination, port)).await?;
        if sent != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {} of {} bytes", sent, payload.len()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PacketSender for UdpTransmitter {
    fn sender_type(&self) -> &'static str {
        "udp"
    }

    async fn deliver(&self, packet: &MagicPacket, target: &WakeTarget) -> Result<DeliveryReport> {
        let destinations = target.destinations();
        if destinations.is_empty() {
            return Err(TransmitError::NoDestinations);
        }

        let mut report = DeliveryReport::default();

        for destination in &destinations {
            match self.send_one(packet, destination, target.port).await {
                Ok(()) => {
                    debug!(
                        destination = %destination,
                        port = target.port,
                        mac = %target.hardware_address,
                        "Magic packet sent"
                    );
                    report.delivered.push(destination.to_string());
                }
                Err(e) => {
                    warn!(
                        destination = %destination,
                        port = target.port,
                        error = %e,
                        "Failed to send magic packet"
                    );
                    report.failed.push((destination.to_string(), e.to_string()));
                }
            }
        }

        if report.delivered.is_empty() {
            let last_error = report
                .failed
                .last()
                .map(|(dest, err)| format!("{}: {}", dest, err))
                .unwrap_or_default();
            return Err(TransmitError::AllDestinationsFailed {
                attempts: destinations.len(),
                last_error,
            });
        }

        Ok(report)
    }
}
