// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for wakegate-server.

use std::net::SocketAddr;

use wakegate_core::WakeConfig;

/// Default HTTP listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Managed service and wake settings.
    pub wake: WakeConfig,
    /// Address the gate listens on.
    pub listen_addr: SocketAddr,
    /// Base URL requests are forwarded to once the service is healthy.
    pub upstream_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Besides the `WAKEGATE_*` service settings read by
    /// [`WakeConfig::from_env`], the gateway reads:
    /// - `WAKEGATE_UPSTREAM_URL` (required): backend base URL
    /// - `WAKEGATE_LISTEN_PORT` (default 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let wake = WakeConfig::from_lookup(&lookup)?;

        let upstream_url = lookup("WAKEGATE_UPSTREAM_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar("WAKEGATE_UPSTREAM_URL"))?;
        if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUpstreamUrl(upstream_url));
        }

        let port: u16 = match lookup("WAKEGATE_LISTEN_PORT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort)?,
            None => DEFAULT_LISTEN_PORT,
        };

        Ok(Self {
            wake,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            upstream_url,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Service settings are invalid.
    #[error(transparent)]
    Wake(#[from] wakegate_core::ConfigError),
    /// A required environment variable is missing.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// The listen port is invalid.
    #[error("Invalid port number")]
    InvalidPort,
    /// The upstream URL is not an http(s) URL.
    #[error("Invalid upstream URL '{0}': expected http:// or https://")]
    InvalidUpstreamUrl(String),
}
