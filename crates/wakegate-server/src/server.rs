// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Router assembly and the HTTP server loop.

use anyhow::Result;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::gate::gate;
use crate::handlers::{
    GatewayState, config_handler, power_off_handler, redirect_handler, status_handler,
    wake_handler,
};

/// Build the gateway router.
///
/// Every request that is not a control route goes through the gate and then
/// to `upstream`. Control routes exist only in interactive mode and are never
/// gated.
pub fn router(state: GatewayState, upstream: Router) -> Router {
    let gated = upstream.layer(middleware::from_fn_with_state(state.clone(), gate));

    let router = if state.settings.interactive {
        Router::new()
            .route("/control/wake", post(wake_handler))
            .route("/control/poweroff", post(power_off_handler))
            .route("/control/status", get(status_handler))
            .route("/control/redirect", post(redirect_handler))
            .route("/control/config", get(config_handler))
            .with_state(state)
    } else {
        Router::new()
    };

    router.fallback_service(gated).layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` flips to true.
pub async fn run_server_with_shutdown(
    listener: TcpListener,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    info!(addr = %local_addr, "HTTP server stopped");
    Ok(())
}
