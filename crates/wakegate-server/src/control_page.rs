// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Placeholder control page served while the service is down.

use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, RETRY_AFTER};
use axum::response::{IntoResponse, Response};

use crate::handlers::ControlSettings;

/// Answer an unhealthy, interactive-mode request with the control page.
pub fn unavailable(settings: &ControlSettings) -> Response {
    let retry_after = settings.redirect_delay.as_secs().max(1).to_string();
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [
            (CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (CACHE_CONTROL, "no-store".to_string()),
            (RETRY_AFTER, retry_after),
        ],
        render(settings),
    )
        .into_response()
}

/// Render the page body.
pub fn render(settings: &ControlSettings) -> String {
    let name = escape_html(&settings.service_name);
    let power_off = if settings.show_power_off_button {
        "<li><code>POST /control/poweroff</code> shuts the service down</li>\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{name} is offline</title>
</head>
<body data-confirm-power-off="{confirm}" data-redirect-delay="{delay}">
<h1>{name} is offline</h1>
<p>The service is asleep or unreachable.</p>
<ul>
<li><code>POST /control/wake</code> wakes the service</li>
{power_off}<li><code>GET /control/status</code> reports progress</li>
<li><code>POST /control/redirect?path=/</code> returns to the service</li>
<li><code>GET /control/config</code> page settings</li>
</ul>
</body>
</html>
"#,
        confirm = settings.confirm_power_off,
        delay = settings.redirect_delay.as_secs(),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
