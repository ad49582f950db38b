// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Control surface tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum::http::header::LOCATION;
use tokio::time::Instant;
use tower::ServiceExt;
use wakegate_core::health::ScriptedProbe;
use wakegate_core::lifecycle::Phase;
use wakegate_core::transmitter::MockTransmitter;

use common::*;

#[tokio::test(start_paused = true)]
async fn test_status_reports_idle_and_unhealthy() {
    let ctx = TestContext::interactive(ScriptedProbe::always(false));

    let response = ctx.app().oneshot(get("/control/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["isHealthy"], false);
    assert_eq!(json["isWaking"], false);
    assert_eq!(json["isPoweringOff"], false);
    assert_eq!(json["progress"], 0);
    assert!(json["message"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_status_answers_from_cache_without_health_request() {
    let ctx = TestContext::interactive(
        ScriptedProbe::always(true).with_delay(Duration::from_secs(5)),
    );
    let app = ctx.app();

    // No verdict recorded yet.
    let started = Instant::now();
    let json = body_json(app.clone().oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(json["isHealthy"], false);
    assert_eq!(ctx.probe.call_count(), 0);

    assert!(ctx.state.lifecycle.health().probe().await);
    assert_eq!(ctx.probe.call_count(), 1);

    // Stale verdict is still served as-is.
    tokio::time::advance(HEALTH_INTERVAL + Duration::from_secs(1)).await;
    let started = Instant::now();
    let json = body_json(app.oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(json["isHealthy"], true);
    assert_eq!(ctx.probe.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wake_admission() {
    let ctx = TestContext::interactive(ScriptedProbe::always(false));
    let app = ctx.app();

    let json = body_json(app.clone().oneshot(post("/control/wake")).await.unwrap()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Wake-up initiated for Media Server");

    let json = body_json(app.clone().oneshot(post("/control/wake")).await.unwrap()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Wake-up already in progress");

    let json = body_json(app.clone().oneshot(post("/control/poweroff")).await.unwrap()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Wake-up already in progress");

    let json = body_json(app.oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(json["isWaking"], true);
    assert_eq!(json["isPoweringOff"], false);
}

#[tokio::test(start_paused = true)]
async fn test_wake_completes_and_status_reports_online() {
    let ctx = TestContext::interactive(ScriptedProbe::new([false, true]));
    let app = ctx.app();

    let json = body_json(app.clone().oneshot(post("/control/wake")).await.unwrap()).await;
    assert_eq!(json["success"], true);

    let mut updates = ctx.state.lifecycle.subscribe();
    updates.wait_for(|s| s.phase == Phase::Idle).await.unwrap();

    let json = body_json(app.oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(json["isHealthy"], true);
    assert_eq!(json["isWaking"], false);
    assert_eq!(json["progress"], 100);
    assert_eq!(json["message"], "Media Server is online");
    assert_eq!(ctx.transmitter.delivery_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_lifecycle() {
    let ctx = TestContext::interactive(ScriptedProbe::always(true));
    let app = ctx.app();

    let json = body_json(app.clone().oneshot(post("/control/poweroff")).await.unwrap()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Power-off initiated for Media Server");

    let json = body_json(app.clone().oneshot(post("/control/wake")).await.unwrap()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Power-off already in progress");

    let json = body_json(app.clone().oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(json["isPoweringOff"], true);

    tokio::time::sleep(Duration::from_secs(4)).await;

    let json = body_json(app.oneshot(get("/control/status")).await.unwrap()).await;
    assert_eq!(json["isPoweringOff"], false);
    assert_eq!(ctx.transmitter.delivery_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_disabled() {
    let ctx = TestContext::build(
        ScriptedProbe::always(true),
        MockTransmitter::new(),
        true,
        false,
    );

    let json = body_json(ctx.app().oneshot(post("/control/poweroff")).await.unwrap()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Power-off is disabled");
    assert_eq!(ctx.state.lifecycle.state().phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_config_endpoint() {
    let ctx = TestContext::interactive(ScriptedProbe::always(false));

    let response = ctx.app().oneshot(get("/control/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["serviceName"], "Media Server");
    assert_eq!(json["showPowerOffButton"], true);
    assert_eq!(json["confirmPowerOff"], true);
    assert_eq!(json["redirectDelay"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_redirect_rejects_foreign_targets() {
    let ctx = TestContext::interactive(ScriptedProbe::always(false));
    let app = ctx.app();

    for (uri, expected) in [
        ("/control/redirect?path=%2Fweb%2Findex.html", "/web/index.html"),
        ("/control/redirect?path=https%3A%2F%2Fevil.example", "/"),
        ("/control/redirect?path=%2F%2Fevil.example", "/"),
        ("/control/redirect", "/"),
    ] {
        let response = app.clone().oneshot(post(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[LOCATION], expected, "{uri}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_control_routes_method_mismatch() {
    let ctx = TestContext::interactive(ScriptedProbe::always(false));

    let response = ctx.app().oneshot(get("/control/wake")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(ctx.transmitter.delivery_count(), 0);
}
