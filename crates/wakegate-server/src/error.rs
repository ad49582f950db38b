// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for wakegate-server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream base URL cannot be used.
    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    /// The upstream request failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The inbound request body could not be read.
    #[error("Request body error: {0}")]
    Body(#[from] axum::Error),

    /// The inbound request body exceeds the relay limit.
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

/// Result type using the gateway Error.
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!(error = %self, "Request failed");
        let (status, message) = match self {
            Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "Bad Gateway: upstream request failed"),
            Error::Body(_) => (StatusCode::BAD_REQUEST, "Bad Request: unreadable request body"),
            Error::BodyTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large: request body exceeds the relay limit",
            ),
            Error::InvalidUpstreamUrl(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error: invalid upstream URL",
            ),
        };
        (status, message).into_response()
    }
}
