// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.
//!
//! Every problem found here is fatal: a gate with a malformed hardware address
//! or a non-numeric duration must never start serving.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::magic_packet::{InvalidAddressFormat, MacAddress, parse_hardware_address};

/// Default UDP port for magic packets (discard service).
pub const DEFAULT_PORT: u16 = 9;
/// Default per-attempt wait for the service to become healthy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of wake attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default pause between wake attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
/// Default freshness window for cached health verdicts.
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);
/// Default redirect delay used by the control page.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(3);
/// Default shutdown action identifier.
pub const DEFAULT_POWER_OFF_COMMAND: &str = "/usr/local/bin/shutdown-script.sh";
/// Default display name.
pub const DEFAULT_SERVICE_NAME: &str = "Service";

/// Configuration of the managed service and how to wake it.
#[derive(Debug, Clone)]
pub struct WakeConfig {
    /// Readiness endpoint probed by the health monitor.
    pub health_check: String,
    /// Hardware address of the machine to wake.
    pub mac_address: MacAddress,
    /// Optional direct (unicast) destination for the magic packet.
    pub ip_address: Option<String>,
    /// Explicit broadcast address; disables interface discovery when set.
    pub broadcast_address: Option<Ipv4Addr>,
    /// Restrict interface discovery to this interface.
    pub network_interface: Option<String>,
    /// Destination UDP port.
    pub port: u16,
    /// How long to wait for health after each delivered packet.
    pub timeout: Duration,
    /// Number of wake attempts (at least 1).
    pub retry_attempts: u32,
    /// Pause between wake attempts.
    pub retry_interval: Duration,
    /// How long a cached health verdict stays fresh.
    pub health_check_interval: Duration,
    /// Interactive mode: deflect unhealthy requests to the control surface.
    pub enable_control_page: bool,
    /// Allow power-off requests from the control surface.
    pub show_power_off_button: bool,
    /// Identifier of the shutdown action announced on power-off.
    pub power_off_command: String,
    /// The control page should ask for confirmation before power-off.
    pub confirm_power_off: bool,
    /// Delay before the control page redirects to the service.
    pub redirect_delay: Duration,
    /// Display name used in progress messages.
    pub service_name: String,
}

impl WakeConfig {
    /// Build a configuration with defaults for everything but the two
    /// required fields.
    pub fn for_target(health_check: &str, mac_address: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            health_check: health_check.to_string(),
            mac_address: parse_hardware_address(mac_address)?,
            ip_address: None,
            broadcast_address: None,
            network_interface: None,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            enable_control_page: false,
            show_power_off_button: true,
            power_off_command: DEFAULT_POWER_OFF_COMMAND.to_string(),
            confirm_power_off: true,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `WAKEGATE_HEALTH_CHECK`: readiness URL
    /// - `WAKEGATE_MAC_ADDRESS`: hardware address of the target
    ///
    /// Optional (with defaults):
    /// - `WAKEGATE_IP_ADDRESS`, `WAKEGATE_BROADCAST_ADDRESS`, `WAKEGATE_NETWORK_INTERFACE`
    /// - `WAKEGATE_PORT` (9), `WAKEGATE_TIMEOUT` (30), `WAKEGATE_RETRY_ATTEMPTS` (3),
    ///   `WAKEGATE_RETRY_INTERVAL` (5), `WAKEGATE_HEALTH_CHECK_INTERVAL` (10)
    /// - `WAKEGATE_ENABLE_CONTROL_PAGE` (false), `WAKEGATE_SHOW_POWER_OFF_BUTTON` (true),
    ///   `WAKEGATE_POWER_OFF_COMMAND`, `WAKEGATE_CONFIRM_POWER_OFF` (true),
    ///   `WAKEGATE_REDIRECT_DELAY` (3), `WAKEGATE_SERVICE_NAME` ("Service")
    ///
    /// Durations are whole seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let health_check =
            get("WAKEGATE_HEALTH_CHECK").ok_or(ConfigError::Missing("WAKEGATE_HEALTH_CHECK"))?;
        let mac_address =
            get("WAKEGATE_MAC_ADDRESS").ok_or(ConfigError::Missing("WAKEGATE_MAC_ADDRESS"))?;

        let mut config = Self::for_target(&health_check, &mac_address)?;

        if let Some(ip) = get("WAKEGATE_IP_ADDRESS") {
            ip.parse::<Ipv4Addr>().map_err(|_| {
                ConfigError::Invalid("WAKEGATE_IP_ADDRESS", "must be an IPv4 address")
            })?;
            config.ip_address = Some(ip);
        }

        if let Some(broadcast) = get("WAKEGATE_BROADCAST_ADDRESS") {
            config.broadcast_address = Some(broadcast.parse().map_err(|_| {
                ConfigError::Invalid("WAKEGATE_BROADCAST_ADDRESS", "must be an IPv4 address")
            })?);
        }

        config.network_interface = get("WAKEGATE_NETWORK_INTERFACE");

        if let Some(port) = get("WAKEGATE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid("WAKEGATE_PORT", "must be a valid port number"))?;
        }

        if let Some(timeout) = get("WAKEGATE_TIMEOUT") {
            config.timeout = parse_seconds("WAKEGATE_TIMEOUT", &timeout)?;
        }

        if let Some(attempts) = get("WAKEGATE_RETRY_ATTEMPTS") {
            config.retry_attempts = attempts.parse().map_err(|_| {
                ConfigError::Invalid("WAKEGATE_RETRY_ATTEMPTS", "must be a positive integer")
            })?;
        }

        if let Some(interval) = get("WAKEGATE_RETRY_INTERVAL") {
            config.retry_interval = parse_seconds("WAKEGATE_RETRY_INTERVAL", &interval)?;
        }

        if let Some(interval) = get("WAKEGATE_HEALTH_CHECK_INTERVAL") {
            config.health_check_interval =
                parse_seconds("WAKEGATE_HEALTH_CHECK_INTERVAL", &interval)?;
        }

        if let Some(flag) = get("WAKEGATE_ENABLE_CONTROL_PAGE") {
            config.enable_control_page = parse_bool("WAKEGATE_ENABLE_CONTROL_PAGE", &flag)?;
        }

        if let Some(flag) = get("WAKEGATE_SHOW_POWER_OFF_BUTTON") {
            config.show_power_off_button = parse_bool("WAKEGATE_SHOW_POWER_OFF_BUTTON", &flag)?;
        }

        // An explicitly empty command is kept so validation can reject it.
        if let Some(command) = lookup("WAKEGATE_POWER_OFF_COMMAND") {
            config.power_off_command = command.trim().to_string();
        }

        if let Some(flag) = get("WAKEGATE_CONFIRM_POWER_OFF") {
            config.confirm_power_off = parse_bool("WAKEGATE_CONFIRM_POWER_OFF", &flag)?;
        }

        if let Some(delay) = get("WAKEGATE_REDIRECT_DELAY") {
            config.redirect_delay = parse_seconds("WAKEGATE_REDIRECT_DELAY", &delay)?;
        }

        if let Some(name) = get("WAKEGATE_SERVICE_NAME") {
            config.service_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.health_check.trim().is_empty() {
            return Err(ConfigError::Missing("WAKEGATE_HEALTH_CHECK"));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "WAKEGATE_RETRY_ATTEMPTS",
                "must be a positive integer",
            ));
        }
        if self.show_power_off_button && self.power_off_command.is_empty() {
            return Err(ConfigError::PowerOffCommandRequired);
        }
        Ok(())
    }
}

fn parse_seconds(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::Invalid(key, "must be a whole number of seconds"))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key, "must be true or false")),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),

    /// The hardware address is malformed.
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddressFormat),

    /// Power-off is enabled without a shutdown action to announce.
    #[error("WAKEGATE_POWER_OFF_COMMAND is required when WAKEGATE_SHOW_POWER_OFF_BUTTON is enabled")]
    PowerOffCommandRequired,
}
