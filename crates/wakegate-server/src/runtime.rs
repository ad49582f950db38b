// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embeddable runtime for wakegate-server.
//!
//! [`GatewayRuntime`] binds the listener, serves the gateway router on a
//! background task and stops it gracefully on [`shutdown`](GatewayRuntime::shutdown).
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wakegate_core::{HttpHealthProbe, UdpTransmitter, WakeConfig};
//! use wakegate_server::handlers::GatewayState;
//! use wakegate_server::runtime::GatewayRuntime;
//! use wakegate_server::upstream::{self, Forwarder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WakeConfig::from_env()?;
//!     let probe = Arc::new(HttpHealthProbe::new(&config.health_check)?);
//!     let state = GatewayState::from_config(&config, Arc::new(UdpTransmitter::new()), probe);
//!
//!     let runtime = GatewayRuntime::builder()
//!         .state(state)
//!         .upstream(upstream::router(Forwarder::new("http://10.0.0.5:8096")?))
//!         .bind_addr("0.0.0.0:8080".parse()?)
//!         .build()?
//!         .start()
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! Shutdown stops the listener only. Wake and power-off sequences that are
//! already admitted are not cancelled.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::handlers::GatewayState;
use crate::server::{router, run_server_with_shutdown};

/// Builder for creating a [`GatewayRuntime`].
pub struct GatewayRuntimeBuilder {
    state: Option<GatewayState>,
    upstream: Option<Router>,
    bind_addr: SocketAddr,
}

impl Default for GatewayRuntimeBuilder {
    fn default() -> Self {
        Self {
            state: None,
            upstream: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], crate::config::DEFAULT_LISTEN_PORT)),
        }
    }
}

impl GatewayRuntimeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shared gateway state (required).
    pub fn state(mut self, state: GatewayState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the router gated requests are handed to (required).
    pub fn upstream(mut self, upstream: Router) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Set the listen address.
    ///
    /// Default: `0.0.0.0:8080`
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Build the runtime configuration.
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GatewayRuntimeConfig> {
        let state = self
            .state
            .ok_or_else(|| anyhow::anyhow!("state is required"))?;
        let upstream = self
            .upstream
            .ok_or_else(|| anyhow::anyhow!("upstream is required"))?;

        Ok(GatewayRuntimeConfig {
            state,
            upstream,
            bind_addr: self.bind_addr,
        })
    }
}

/// Configuration for a [`GatewayRuntime`].
pub struct GatewayRuntimeConfig {
    state: GatewayState,
    upstream: Router,
    bind_addr: SocketAddr,
}

impl GatewayRuntimeConfig {
    /// Bind the listener and start serving.
    pub async fn start(self) -> Result<GatewayRuntime> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let app = router(self.state.clone(), self.upstream);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_handle = tokio::spawn(run_server_with_shutdown(listener, app, shutdown_rx));

        info!(
            addr = %local_addr,
            interactive = self.state.settings.interactive,
            service = %self.state.settings.service_name,
            "GatewayRuntime started"
        );

        Ok(GatewayRuntime {
            server_handle,
            shutdown_tx,
            state: self.state,
            local_addr,
        })
    }
}

/// A running gateway that can be embedded in an application.
pub struct GatewayRuntime {
    server_handle: JoinHandle<Result<()>>,
    shutdown_tx: watch::Sender<bool>,
    state: GatewayState,
    local_addr: SocketAddr,
}

impl GatewayRuntime {
    /// Create a new builder for configuring the runtime.
    pub fn builder() -> GatewayRuntimeBuilder {
        GatewayRuntimeBuilder::new()
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get a reference to the shared gateway state.
    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Check if the server task is still running.
    pub fn is_running(&self) -> bool {
        !self.server_handle.is_finished()
    }

    /// Gracefully shut down the HTTP server and wait for it to stop.
    pub async fn shutdown(self) -> Result<()> {
        info!("GatewayRuntime shutting down...");
        let _ = self.shutdown_tx.send(true);

        match self.server_handle.await {
            Ok(Ok(())) => {
                info!("GatewayRuntime shutdown complete");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("GatewayRuntime server error during shutdown: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("GatewayRuntime server task panicked: {}", e);
                Err(anyhow::anyhow!("server task panicked: {}", e))
            }
        }
    }
}
