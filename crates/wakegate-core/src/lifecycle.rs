// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wake and power-off orchestration.
//!
//! The orchestrator owns a single [`OperationState`] published through a
//! `watch` channel. Admission flips the phase from `Idle` in one atomic
//! modification, so at most one wake or power-off runs at a time. Accepted
//! sequences run on detached tasks and write their progress into the same
//! channel that status pollers read.
//!
//! ```text
//! Idle ──request_wake──▶ Waking ──online / exhausted──▶ Idle
//! Idle ──request_power_off──▶ PoweringOff ──settled──▶ Idle
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::WakeConfig;
use crate::health::HealthMonitor;
use crate::magic_packet::MagicPacket;
use crate::resolver::WakeTarget;
use crate::transmitter::PacketSender;

/// Pause between readiness probes while waiting for the service.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long the power-off phase stays visible after signalling shutdown.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_secs(3);

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing running.
    #[default]
    Idle,
    /// A wake sequence is running.
    Waking,
    /// A power-off sequence is running.
    PoweringOff,
}

impl Phase {
    /// Human readable name of the operation running in this phase.
    pub fn operation(&self) -> &'static str {
        match self {
            Phase::Idle => "No operation",
            Phase::Waking => "Wake-up",
            Phase::PoweringOff => "Power-off",
        }
    }
}

/// Progress of the current (or last) operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    /// Current phase.
    pub phase: Phase,
    /// When the running operation was admitted.
    pub started_at: Option<DateTime<Utc>>,
    /// Last progress message.
    pub message: String,
    /// Progress in percent (0..=100).
    pub progress: u8,
}

/// A wake or power-off request was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Another operation is running.
    #[error("{} already in progress", .0.operation())]
    Busy(Phase),

    /// Power-off requests are disabled.
    #[error("Power-off is disabled")]
    PowerOffDisabled,
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Display name used in progress messages.
    pub service_name: String,
    /// Number of wake attempts.
    pub retry_attempts: u32,
    /// Pause between wake attempts.
    pub retry_interval: Duration,
    /// How long to wait for health after each delivered packet.
    pub timeout: Duration,
    /// Pause between readiness probes.
    pub poll_interval: Duration,
    /// Duration of the power-off phase.
    pub settle_interval: Duration,
    /// Accept power-off requests.
    pub power_off_enabled: bool,
    /// Identifier announced when power-off is signalled.
    pub power_off_command: String,
}

impl From<&WakeConfig> for LifecycleConfig {
    fn from(config: &WakeConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            retry_attempts: config.retry_attempts,
            retry_interval: config.retry_interval,
            timeout: config.timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_interval: DEFAULT_SETTLE_INTERVAL,
            power_off_enabled: config.show_power_off_button,
            power_off_command: config.power_off_command.clone(),
        }
    }
}

/// Wake/power-off orchestrator.
pub struct Lifecycle {
    config: LifecycleConfig,
    target: WakeTarget,
    packet: MagicPacket,
    transmitter: Arc<dyn PacketSender>,
    health: Arc<HealthMonitor>,
    state: watch::Sender<OperationState>,
}

impl Lifecycle {
    /// Create an idle orchestrator.
    pub fn new(
        config: LifecycleConfig,
        target: WakeTarget,
        transmitter: Arc<dyn PacketSender>,
        health: Arc<HealthMonitor>,
    ) -> Self {
        let packet = MagicPacket::new(&target.hardware_address);
        let (state, _) = watch::channel(OperationState::default());
        Self {
            config,
            target,
            packet,
            transmitter,
            health,
            state,
        }
    }

    /// Current operation state.
    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    /// Subscribe to operation state changes.
    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }

    /// Health monitor shared with the gate.
    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    /// Resolved wake target.
    pub fn target(&self) -> &WakeTarget {
        &self.target
    }

    /// Orchestrator settings.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Admit a wake and run it in the background.
    pub fn request_wake(self: &Arc<Self>) -> Result<(), AdmissionError> {
        self.admit(Phase::Waking)?;

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_wake_sequence().await;
        });
        Ok(())
    }

    /// Admit a power-off and run it in the background.
    pub fn request_power_off(self: &Arc<Self>) -> Result<(), AdmissionError> {
        if !self.config.power_off_enabled {
            return Err(AdmissionError::PowerOffDisabled);
        }
        self.admit(Phase::PoweringOff)?;

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_power_off_sequence().await;
        });
        Ok(())
    }

    /// Wake the service inline and report whether it became healthy.
    ///
    /// When another operation is already running, waits for it to finish and
    /// reports the health it left behind instead of starting a second one.
    pub async fn wake_and_wait(&self) -> bool {
        match self.admit(Phase::Waking) {
            Ok(()) => self.run_wake_sequence().await,
            Err(e) => {
                debug!(reason = %e, "Joining running operation");
                let mut updates = self.state.subscribe();
                if updates.wait_for(|s| s.phase == Phase::Idle).await.is_err() {
                    return false;
                }
                self.health.snapshot().await.healthy
            }
        }
    }

    fn admit(&self, phase: Phase) -> Result<(), AdmissionError> {
        let name = &self.config.service_name;
        let mut running = None;

        self.state.send_if_modified(|state| {
            if state.phase != Phase::Idle {
                running = Some(state.phase);
                return false;
            }
            let message = match phase {
                Phase::PoweringOff => format!("Shutting down {}...", name),
                _ => format!("Waking up {}...", name),
            };
            *state = OperationState {
                phase,
                started_at: Some(Utc::now()),
                message,
                progress: 0,
            };
            true
        });

        match running {
            Some(running) => {
                debug!(requested = ?phase, running = ?running, "Operation rejected");
                Err(AdmissionError::Busy(running))
            }
            None => {
                info!(operation = phase.operation(), service = %name, "Operation started");
                Ok(())
            }
        }
    }

    fn publish(&self, progress: u8, message: String) {
        self.state.send_modify(|state| {
            state.progress = progress.min(100);
            state.message = message;
        });
    }

    fn finish(&self, progress: u8, message: String) {
        self.state.send_modify(|state| {
            *state = OperationState {
                phase: Phase::Idle,
                started_at: None,
                message,
                progress,
            };
        });
    }

    async fn run_wake_sequence(&self) -> bool {
        let name = &self.config.service_name;
        let attempts = self.config.retry_attempts.max(1);
        let mut delivery_failure: Option<String> = None;

        for attempt in 1..=attempts {
            let base = percent(attempt - 1, attempts, 40);
            self.publish(
                base,
                format!(
                    "Sending wake signal to {} (attempt {}/{})...",
                    name, attempt, attempts
                ),
            );

            match self.transmitter.deliver(&self.packet, &self.target).await {
                Ok(report) => {
                    delivery_failure = None;
                    info!(
                        attempt,
                        attempts,
                        transmitter = self.transmitter.sender_type(),
                        delivered = report.delivered.len(),
                        failed = report.failed.len(),
                        "Wake signal sent"
                    );
                    self.publish(
                        40 + percent(attempt, attempts, 30),
                        format!("Wake signal sent, waiting for {} to start...", name),
                    );

                    if self.await_healthy().await {
                        info!(attempt, service = %name, "Service is online");
                        self.finish(100, format!("{} is online", name));
                        return true;
                    }
                    warn!(
                        attempt,
                        timeout_secs = self.config.timeout.as_secs(),
                        "Service did not become healthy in time"
                    );
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Failed to send wake signal");
                    let message = format!(
                        "Failed to send wake signal (attempt {}/{}): {}",
                        attempt, attempts, e
                    );
                    self.publish(base, message.clone());
                    delivery_failure = Some(message);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.retry_interval).await;
            }
        }

        let message = match delivery_failure {
            Some(failure) => failure,
            None => format!(
                "Wake attempts exhausted: {} did not respond after {} attempts",
                name, attempts
            ),
        };
        warn!(attempts, service = %name, "Wake sequence failed");
        self.finish(0, message);
        false
    }

    async fn await_healthy(&self) -> bool {
        let timeout = self.config.timeout;
        let started = Instant::now();

        loop {
            if started.elapsed() >= timeout {
                return false;
            }
            if self.health.probe().await {
                return true;
            }

            let elapsed = started.elapsed();
            let remaining = timeout.saturating_sub(elapsed);
            if remaining.is_zero() {
                return false;
            }

            let waited = elapsed.as_millis().min(timeout.as_millis());
            let progress = 70 + (25 * waited / timeout.as_millis().max(1)) as u8;
            self.publish(
                progress.min(95),
                format!(
                    "Waiting for {} to respond... ({}s remaining)",
                    self.config.service_name,
                    remaining.as_secs()
                ),
            );

            tokio::time::sleep(self.config.poll_interval.min(remaining)).await;
        }
    }

    async fn run_power_off_sequence(&self) {
        let name = &self.config.service_name;

        warn!(
            command = %self.config.power_off_command,
            service = %name,
            "Power-off requested, shutdown signalled"
        );
        self.publish(50, format!("Shutdown signal sent to {}", name));

        tokio::time::sleep(self.config.settle_interval).await;

        info!(service = %name, "Power-off sequence finished");
        self.finish(100, format!("{} is shutting down", name));
    }
}

fn percent(step: u32, steps: u32, span: u32) -> u8 {
    (step.min(steps) * span / steps.max(1)) as u8
}
