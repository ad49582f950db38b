// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Hardware address parsing and Wake-on-LAN payload construction.
//!
//! Both operations are pure: no I/O, no shared state. The payload layout is
//! fixed by the Wake-on-LAN convention:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────┐
//! │ 6 × 0xFF (sync)      │ 16 × target hardware address (96 bytes) │
//! └──────────────────────┴──────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of bytes in a hardware (MAC) address.
pub const MAC_LEN: usize = 6;

/// Number of times the address is repeated in the payload.
const REPETITIONS: usize = 16;

/// Total payload length in bytes.
pub const MAGIC_PACKET_LEN: usize = MAC_LEN + MAC_LEN * REPETITIONS;

/// Separators accepted between address octets.
const SEPARATORS: [char; 3] = [':', '-', '.'];

/// The textual hardware address could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hardware address format '{input}': {reason}")]
pub struct InvalidAddressFormat {
    /// The input as supplied by the caller.
    pub input: String,
    /// Why the input was rejected.
    pub reason: &'static str,
}

/// A 6-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; MAC_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub const fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = InvalidAddressFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hardware_address(s)
    }
}

/// Parse a textual hardware address.
///
/// Accepts `00:11:22:33:44:55`, `00-11-22-33-44-55`, `0011.2233.4455` and
/// `001122334455`, in any letter case. After removing separators exactly 12
/// hexadecimal characters must remain.
pub fn parse_hardware_address(text: &str) -> Result<MacAddress, InvalidAddressFormat> {
    let cleaned: String = text.chars().filter(|c| !SEPARATORS.contains(c)).collect();

    if cleaned.len() != MAC_LEN * 2 {
        return Err(InvalidAddressFormat {
            input: text.to_string(),
            reason: "expected 12 hexadecimal characters",
        });
    }

    let mut bytes = [0u8; MAC_LEN];
    hex::decode_to_slice(&cleaned, &mut bytes).map_err(|_| InvalidAddressFormat {
        input: text.to_string(),
        reason: "contains non-hexadecimal characters",
    })?;

    Ok(MacAddress(bytes))
}

/// A ready-to-send Wake-on-LAN payload.
#[derive(Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    /// Build the payload for `address`.
    pub fn new(address: &MacAddress) -> Self {
        let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
        for chunk in packet[MAC_LEN..].chunks_exact_mut(MAC_LEN) {
            chunk.copy_from_slice(&address.0);
        }
        Self(packet)
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn target_bytes(&self) -> [u8; MAC_LEN] {
        let mut target = [0u8; MAC_LEN];
        target.copy_from_slice(&self.0[MAC_LEN..MAC_LEN * 2]);
        target
    }
}

impl fmt::Debug for MagicPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicPacket")
            .field("len", &self.0.len())
            .field("target", &MacAddress::new(self.target_bytes()))
            .finish()
    }
}

/// Build the payload for `address` as a plain byte array.
pub fn build_wake_payload(address: &MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    MagicPacket::new(address).0
}
