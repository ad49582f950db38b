// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wakegate - Wake-on-LAN gate
//!
//! An HTTP gate that:
//! - Forwards requests to the backend while it is healthy
//! - Wakes the backend with magic packets when it is not
//! - Optionally serves a control surface for wake and power-off

use std::sync::Arc;
use tracing::{info, warn};

use wakegate_core::{HttpHealthProbe, UdpTransmitter};
use wakegate_server::config::Config;
use wakegate_server::handlers::GatewayState;
use wakegate_server::runtime::GatewayRuntime;
use wakegate_server::upstream::{self, Forwarder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wakegate=info,wakegate_core=info,wakegate_server=info".into()),
        )
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        listen_addr = %config.listen_addr,
        upstream = %config.upstream_url,
        health_check = %config.wake.health_check,
        mac = %config.wake.mac_address,
        interactive = config.wake.enable_control_page,
        "Starting Wakegate"
    );

    let probe = Arc::new(HttpHealthProbe::new(&config.wake.health_check)?);
    let transmitter = Arc::new(UdpTransmitter::new());

    // Resolve the wake target once
    let state = GatewayState::from_config(&config.wake, transmitter, probe);
    let target = state.lifecycle.target();
    info!(
        destinations = ?target.destinations(),
        port = target.port,
        "Wake target resolved"
    );

    let runtime = GatewayRuntime::builder()
        .state(state)
        .upstream(upstream::router(Forwarder::new(&config.upstream_url)?))
        .bind_addr(config.listen_addr)
        .build()?
        .start()
        .await?;

    info!(addr = %runtime.local_addr(), "Wakegate ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Graceful shutdown
    runtime.shutdown().await?;

    info!("Wakegate shut down");

    Ok(())
}
