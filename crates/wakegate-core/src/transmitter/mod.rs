// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Packet transmitter module - magic packet delivery backends.

pub mod mock;
mod traits;
pub mod udp;

pub use mock::MockTransmitter;
pub use traits::*;
pub use udp::UdpTransmitter;
