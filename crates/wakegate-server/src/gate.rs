// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Gate middleware in front of the upstream forwarder.
//!
//! Decision order for every proxied request:
//!
//! 1. A pending bypass grant is consumed and the request passes.
//! 2. A healthy cached verdict lets the request pass.
//! 3. Interactive mode deflects to the control page (`503`).
//! 4. Autonomous mode wakes the service inline; the request passes once it is
//!    healthy, otherwise it is answered with `503`.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use crate::control_page;
use crate::handlers::GatewayState;

/// Gate a request on service health.
pub async fn gate(State(state): State<GatewayState>, request: Request, next: Next) -> Response {
    if state.bypass.consume_if_active().await {
        debug!(path = %request.uri().path(), "Bypass consumed, forwarding");
        return next.run(request).await;
    }

    if state.lifecycle.health().cached_healthy().await {
        return next.run(request).await;
    }

    if state.settings.interactive {
        debug!(path = %request.uri().path(), "Service unhealthy, serving control page");
        return control_page::unavailable(&state.settings);
    }

    info!(path = %request.uri().path(), "Service unhealthy, waking before forwarding");
    if state.lifecycle.wake_and_wait().await {
        return next.run(request).await;
    }

    let operation = state.lifecycle.state();
    warn!(message = %operation.message, "Service unavailable after wake attempts");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!(
            "{} is unavailable: {}",
            state.settings.service_name, operation.message
        ),
    )
        .into_response()
}
