// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Readiness probes.
//!
//! Health is deliberately coarse: any transport error or non-2xx status is
//! "unhealthy". DNS failures, refused connections and application errors are
//! not told apart.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Upper bound for a single readiness request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A single readiness check against the managed service.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns true when the service answered with a 2xx status.
    async fn check(&self) -> bool;
}

/// Probes an HTTP readiness endpoint with a bounded GET.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    /// Create a probe for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a probe for `url` with a custom timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The probed URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                let healthy = status.is_success();
                debug!(url = %self.url, status = status.as_u16(), healthy, "Health check response");
                healthy
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "Health check failed");
                false
            }
        }
    }
}
