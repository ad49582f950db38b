// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wake target resolution.
//!
//! Broadcast delivery across container and bridge network boundaries is
//! unreliable, so the resolver collects every plausible destination up front:
//!
//! 1. A configured broadcast address, used exclusively when present.
//! 2. Otherwise the subnet broadcast address of every up, non-loopback IPv4
//!    interface (optionally restricted to one named interface).
//! 3. The limited broadcast address `255.255.255.255` when nothing else
//!    was found.
//!
//! The scan is a point-in-time query; the resulting [`WakeTarget`] is
//! immutable.

use std::net::Ipv4Addr;

use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use tracing::{debug, warn};

use crate::config::WakeConfig;
use crate::magic_packet::MacAddress;

/// Limited broadcast address used when no interface yields a candidate.
pub const LIMITED_BROADCAST: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Everything the transmitter needs to deliver a wake payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeTarget {
    /// Hardware address of the machine to wake.
    pub hardware_address: MacAddress,
    /// Optional direct destination, tried before any broadcast.
    pub unicast_address: Option<String>,
    /// Ordered, de-duplicated broadcast destinations.
    pub broadcast_addresses: Vec<String>,
    /// Destination UDP port.
    pub port: u16,
}

impl WakeTarget {
    /// Resolve a target from configuration, scanning local interfaces when no
    /// broadcast address is configured.
    pub fn resolve(config: &WakeConfig) -> Self {
        let broadcast_addresses = match &config.broadcast_address {
            Some(explicit) => vec![explicit.to_string()],
            None => discover_broadcast_addresses(config.network_interface.as_deref())
                .into_iter()
                .map(|addr| addr.to_string())
                .collect(),
        };

        Self {
            hardware_address: config.mac_address,
            unicast_address: config.ip_address.clone(),
            broadcast_addresses,
            port: config.port,
        }
    }

    /// All destinations in delivery order: unicast first, then broadcasts.
    pub fn destinations(&self) -> Vec<&str> {
        let mut destinations: Vec<&str> = Vec::with_capacity(self.broadcast_addresses.len() + 1);
        if let Some(unicast) = self.unicast_address.as_deref() {
            destinations.push(unicast);
        }
        for broadcast in &self.broadcast_addresses {
            if !destinations.contains(&broadcast.as_str()) {
                destinations.push(broadcast);
            }
        }
        destinations
    }
}

/// One IPv4 address assigned to a local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name (e.g. `eth0`).
    pub name: String,
    /// Interface is administratively up.
    pub up: bool,
    /// Interface is a loopback device.
    pub loopback: bool,
    /// Assigned address.
    pub address: Ipv4Addr,
    /// Subnet mask.
    pub netmask: Ipv4Addr,
}

/// Compute the directed broadcast address of the subnet containing `address`.
pub fn subnet_broadcast(address: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    let addr = address.octets();
    let mask = netmask.octets();
    Ipv4Addr::new(
        (addr[0] & mask[0]) | !mask[0],
        (addr[1] & mask[1]) | !mask[1],
        (addr[2] & mask[2]) | !mask[2],
        (addr[3] & mask[3]) | !mask[3],
    )
}

/// Derive broadcast candidates from an interface listing.
///
/// Skips down and loopback interfaces, honours the optional interface
/// filter, de-duplicates while keeping first-seen order, and falls back to
/// [`LIMITED_BROADCAST`] when nothing qualifies.
pub fn broadcast_candidates<I>(interfaces: I, only_interface: Option<&str>) -> Vec<Ipv4Addr>
where
    I: IntoIterator<Item = InterfaceAddress>,
{
    let mut candidates: Vec<Ipv4Addr> = Vec::new();

    for iface in interfaces {
        if !iface.up || iface.loopback {
            continue;
        }
        if let Some(wanted) = only_interface
            && iface.name != wanted
        {
            continue;
        }

        let broadcast = subnet_broadcast(iface.address, iface.netmask);
        debug!(
            interface = %iface.name,
            address = %iface.address,
            netmask = %iface.netmask,
            broadcast = %broadcast,
            "Found broadcast candidate"
        );
        if !candidates.contains(&broadcast) {
            candidates.push(broadcast);
        }
    }

    if candidates.is_empty() {
        debug!("No broadcast candidates found, using limited broadcast");
        candidates.push(LIMITED_BROADCAST);
    }

    candidates
}

/// List the IPv4 addresses of all local interfaces.
pub fn scan_interfaces() -> nix::Result<Vec<InterfaceAddress>> {
    let mut found = Vec::new();

    for ifaddr in getifaddrs()? {
        let address = ifaddr
            .address
            .as_ref()
            .and_then(|a| a.as_sockaddr_in())
            .map(|a| a.ip());
        let netmask = ifaddr
            .netmask
            .as_ref()
            .and_then(|m| m.as_sockaddr_in())
            .map(|m| m.ip());

        let (Some(address), Some(netmask)) = (address, netmask) else {
            continue;
        };

        found.push(InterfaceAddress {
            name: ifaddr.interface_name.clone(),
            up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
            loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
            address,
            netmask,
        });
    }

    Ok(found)
}

/// Scan local interfaces and return broadcast candidates.
///
/// A failed scan is logged and degrades to the limited broadcast address.
pub fn discover_broadcast_addresses(only_interface: Option<&str>) -> Vec<Ipv4Addr> {
    match scan_interfaces() {
        Ok(interfaces) => {
            if let Some(name) = only_interface
                && !interfaces.iter().any(|i| i.name == name)
            {
                warn!(interface = %name, "Configured network interface has no IPv4 address");
            }
            broadcast_candidates(interfaces, only_interface)
        }
        Err(e) => {
            warn!(error = %e, "Interface discovery failed, using limited broadcast");
            vec![LIMITED_BROADCAST]
        }
    }
}
