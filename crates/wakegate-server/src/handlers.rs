// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Control surface handlers.
//!
//! Only mounted in interactive mode. Wake and power-off requests return as
//! soon as admission is decided; the page then polls `/control/status`.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wakegate_core::bypass::BypassSession;
use wakegate_core::health::{HealthMonitor, HealthProbe};
use wakegate_core::lifecycle::{Lifecycle, LifecycleConfig, Phase};
use wakegate_core::resolver::WakeTarget;
use wakegate_core::transmitter::PacketSender;
use wakegate_core::WakeConfig;

/// Presentation settings of the control surface.
#[derive(Debug, Clone)]
pub struct ControlSettings {
    /// Display name of the managed service.
    pub service_name: String,
    /// Deflect unhealthy requests to the control page instead of waking inline.
    pub interactive: bool,
    /// Offer the power-off action.
    pub show_power_off_button: bool,
    /// Ask for confirmation before power-off.
    pub confirm_power_off: bool,
    /// Delay before the page redirects to the service once it is online.
    pub redirect_delay: Duration,
}

impl From<&WakeConfig> for ControlSettings {
    fn from(config: &WakeConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            interactive: config.enable_control_page,
            show_power_off_button: config.show_power_off_button,
            confirm_power_off: config.confirm_power_off,
            redirect_delay: config.redirect_delay,
        }
    }
}

/// Shared state of the gate and the control surface.
#[derive(Clone)]
pub struct GatewayState {
    /// Wake/power-off orchestrator (owns the health monitor).
    pub lifecycle: Arc<Lifecycle>,
    /// Post-wake bypass window.
    pub bypass: Arc<BypassSession>,
    /// Control surface settings.
    pub settings: Arc<ControlSettings>,
}

impl GatewayState {
    /// Assemble state from its parts.
    pub fn new(lifecycle: Arc<Lifecycle>, bypass: Arc<BypassSession>, settings: ControlSettings) -> Self {
        Self {
            lifecycle,
            bypass,
            settings: Arc::new(settings),
        }
    }

    /// Build state from configuration, resolving the wake target once.
    pub fn from_config(
        config: &WakeConfig,
        transmitter: Arc<dyn PacketSender>,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        let target = WakeTarget::resolve(config);
        let health = Arc::new(HealthMonitor::new(probe, config.health_check_interval));
        let lifecycle = Arc::new(Lifecycle::new(
            LifecycleConfig::from(config),
            target,
            transmitter,
            health,
        ));
        Self::new(lifecycle, Arc::new(BypassSession::new()), ControlSettings::from(config))
    }
}

/// Outcome of a wake or power-off request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    /// The request was admitted.
    pub success: bool,
    /// What happened, or why the request was rejected.
    pub message: String,
}

/// Service and operation status for pollers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Cached health verdict.
    pub is_healthy: bool,
    /// A wake sequence is running.
    pub is_waking: bool,
    /// A power-off sequence is running.
    pub is_powering_off: bool,
    /// Last progress message.
    pub message: String,
    /// Progress in percent.
    pub progress: u8,
}

/// Settings needed to render the control page.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    /// Display name of the managed service.
    pub service_name: String,
    /// Offer the power-off action.
    pub show_power_off_button: bool,
    /// Ask for confirmation before power-off.
    pub confirm_power_off: bool,
    /// Seconds to wait before redirecting.
    pub redirect_delay: u64,
}

/// Query of the redirect endpoint.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// Path to return to.
    pub path: Option<String>,
}

/// POST /control/wake
pub async fn wake_handler(State(state): State<GatewayState>) -> Json<ActionResponse> {
    let response = match state.lifecycle.request_wake() {
        Ok(()) => ActionResponse {
            success: true,
            message: format!("Wake-up initiated for {}", state.settings.service_name),
        },
        Err(e) => ActionResponse {
            success: false,
            message: e.to_string(),
        },
    };
    Json(response)
}

/// POST /control/poweroff
pub async fn power_off_handler(State(state): State<GatewayState>) -> Json<ActionResponse> {
    let response = match state.lifecycle.request_power_off() {
        Ok(()) => ActionResponse {
            success: true,
            message: format!("Power-off initiated for {}", state.settings.service_name),
        },
        Err(e) => ActionResponse {
            success: false,
            message: e.to_string(),
        },
    };
    Json(response)
}

/// GET /control/status
///
/// Answers from the cached health entry; polling never triggers a probe.
pub async fn status_handler(State(state): State<GatewayState>) -> Json<StatusResponse> {
    let is_healthy = state.lifecycle.health().snapshot().await.healthy;
    let operation = state.lifecycle.state();

    Json(StatusResponse {
        is_healthy,
        is_waking: operation.phase == Phase::Waking,
        is_powering_off: operation.phase == Phase::PoweringOff,
        message: operation.message,
        progress: operation.progress,
    })
}

/// GET /control/config
pub async fn config_handler(State(state): State<GatewayState>) -> Json<ConfigResponse> {
    let settings = &state.settings;
    Json(ConfigResponse {
        service_name: settings.service_name.clone(),
        show_power_off_button: settings.show_power_off_button,
        confirm_power_off: settings.confirm_power_off,
        redirect_delay: settings.redirect_delay.as_secs(),
    })
}

/// POST /control/redirect?path=/x
///
/// Grants the bypass window, then sends the browser back to `path`.
pub async fn redirect_handler(
    State(state): State<GatewayState>,
    Query(query): Query<RedirectQuery>,
) -> Redirect {
    state.bypass.grant().await;

    let target = local_path(query.path.as_deref());
    info!(path = %target, "Bypass granted, redirecting");
    Redirect::to(target)
}

/// Accept only same-origin absolute paths; anything else maps to `/`.
pub fn local_path(path: Option<&str>) -> &str {
    match path {
        Some(p) if p.starts_with('/') && !p.starts_with("//") && !p.contains('\\') => p,
        Some(p) => {
            debug!(path = %p, "Rejected non-local redirect path");
            "/"
        }
        None => "/",
    }
}
