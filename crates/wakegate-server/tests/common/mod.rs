// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for wakegate-server tests.
//!
//! Builds gateway state around the mock transmitter and the scripted probe,
//! and a stub backend that echoes the request path.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use wakegate_core::bypass::BypassSession;
use wakegate_core::health::{HealthMonitor, ScriptedProbe};
use wakegate_core::lifecycle::{Lifecycle, LifecycleConfig};
use wakegate_core::magic_packet::MacAddress;
use wakegate_core::resolver::WakeTarget;
use wakegate_core::transmitter::MockTransmitter;
use wakegate_server::handlers::{ControlSettings, GatewayState};

pub const SERVICE_NAME: &str = "Media Server";
pub const HEALTH_INTERVAL: Duration = Duration::from_secs(10);

/// Test context holding the state and the mocks behind it.
pub struct TestContext {
    pub state: GatewayState,
    pub transmitter: Arc<MockTransmitter>,
    pub probe: Arc<ScriptedProbe>,
}

impl TestContext {
    /// Interactive gateway (control surface enabled).
    pub fn interactive(probe: ScriptedProbe) -> Self {
        Self::build(probe, MockTransmitter::new(), true, true)
    }

    /// Autonomous gateway (inline wake).
    pub fn autonomous(probe: ScriptedProbe) -> Self {
        Self::build(probe, MockTransmitter::new(), false, true)
    }

    /// Fully customised gateway.
    pub fn build(
        probe: ScriptedProbe,
        transmitter: MockTransmitter,
        interactive: bool,
        power_off_enabled: bool,
    ) -> Self {
        let probe = Arc::new(probe);
        let transmitter = Arc::new(transmitter);

        let target = WakeTarget {
            hardware_address: MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            unicast_address: None,
            broadcast_addresses: vec!["192.168.1.255".to_string()],
            port: 9,
        };
        let config = LifecycleConfig {
            service_name: SERVICE_NAME.to_string(),
            retry_attempts: 2,
            retry_interval: Duration::ZERO,
            timeout: Duration::from_secs(2),
            poll_interval: Duration::from_secs(1),
            settle_interval: Duration::from_secs(3),
            power_off_enabled,
            power_off_command: "/usr/local/bin/shutdown-script.sh".to_string(),
        };
        let settings = ControlSettings {
            service_name: SERVICE_NAME.to_string(),
            interactive,
            show_power_off_button: power_off_enabled,
            confirm_power_off: true,
            redirect_delay: Duration::from_secs(3),
        };

        let health = Arc::new(HealthMonitor::new(probe.clone(), HEALTH_INTERVAL));
        let lifecycle = Arc::new(Lifecycle::new(config, target, transmitter.clone(), health));
        let state = GatewayState::new(lifecycle, Arc::new(BypassSession::new()), settings);

        Self {
            state,
            transmitter,
            probe,
        }
    }

    /// Gateway router in front of the echo backend.
    pub fn app(&self) -> Router {
        wakegate_server::server::router(self.state.clone(), backend())
    }
}

/// Stub backend answering `backend:<path>`.
pub fn backend() -> Router {
    Router::new().fallback(|request: Request<Body>| async move {
        format!("backend:{}", request.uri().path())
    })
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri)
}

pub fn post(uri: &str) -> Request<Body> {
    request(Method::POST, uri)
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
