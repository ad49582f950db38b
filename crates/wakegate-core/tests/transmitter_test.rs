// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! UDP transmitter tests against a loopback listener.

use std::time::Duration;

use tokio::net::UdpSocket;
use wakegate_core::magic_packet::{MacAddress, MagicPacket};
use wakegate_core::resolver::WakeTarget;
use wakegate_core::transmitter::{
    MockTransmitter, PacketSender, TransmitError, UdpTransmitter,
};

const MAC: MacAddress = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

fn target(unicast: Option<&str>, broadcasts: &[&str], port: u16) -> WakeTarget {
    WakeTarget {
        hardware_address: MAC,
        unicast_address: unicast.map(str::to_string),
        broadcast_addresses: broadcasts.iter().map(|b| b.to_string()).collect(),
        port,
    }
}

#[tokio::test]
async fn test_udp_delivers_payload_to_unicast() {
    let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let transmitter = UdpTransmitter::new();
    let packet = MagicPacket::new(&MAC);
    let report = transmitter
        .deliver(&packet, &target(Some("127.0.0.1"), &[], port))
        .await
        .unwrap();

    assert_eq!(report.delivered, vec!["127.0.0.1".to_string()]);
    assert!(report.failed.is_empty());

    let mut buf = [0u8; 256];
    let (len, _) = tokio::time::timeout(Duration::from_secs(2), listener.recv_from(&mut buf))
        .await
        .expect("payload not received")
        .unwrap();
    assert_eq!(&buf[..len], packet.as_bytes());
}

#[tokio::test]
async fn test_udp_partial_failure_is_success() {
    let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // An IPv6 destination cannot be reached from the IPv4 socket.
    let report = UdpTransmitter::new()
        .deliver(&MagicPacket::new(&MAC), &target(Some("::1"), &["127.0.0.1"], port))
        .await
        .unwrap();

    assert_eq!(report.delivered, vec!["127.0.0.1".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "::1");
}

#[tokio::test]
async fn test_udp_all_destinations_failed() {
    let err = UdpTransmitter::new()
        .deliver(&MagicPacket::new(&MAC), &target(Some("::1"), &[], 9))
        .await
        .unwrap_err();

    match err {
        TransmitError::AllDestinationsFailed { attempts, last_error } => {
            assert_eq!(attempts, 1);
            assert!(last_error.starts_with("::1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_udp_no_destinations() {
    let err = UdpTransmitter::new()
        .deliver(&MagicPacket::new(&MAC), &target(None, &[], 9))
        .await
        .unwrap_err();
    assert!(matches!(err, TransmitError::NoDestinations));
}

#[tokio::test]
async fn test_mock_records_deliveries() {
    let transmitter = MockTransmitter::failing_first(1);
    let packet = MagicPacket::new(&MAC);
    let target = target(None, &["192.168.1.255"], 9);

    assert!(transmitter.deliver(&packet, &target).await.is_err());
    let report = transmitter.deliver(&packet, &target).await.unwrap();

    assert_eq!(report.delivered, vec!["192.168.1.255".to_string()]);
    assert_eq!(transmitter.delivery_count(), 2);
    assert_eq!(transmitter.sent_packets().await, vec![packet.as_bytes().to_vec()]);
    assert_eq!(transmitter.sender_type(), "mock");
}
