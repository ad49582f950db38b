// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runtime start/shutdown tests over a real listener.

mod common;

use wakegate_core::health::ScriptedProbe;
use wakegate_server::runtime::GatewayRuntime;

use common::*;

#[tokio::test]
async fn test_runtime_serves_and_shuts_down() {
    let ctx = TestContext::interactive(ScriptedProbe::always(true));

    let runtime = GatewayRuntime::builder()
        .state(ctx.state.clone())
        .upstream(backend())
        .bind_addr("127.0.0.1:0".parse().unwrap())
        .build()
        .unwrap()
        .start()
        .await
        .unwrap();
    assert!(runtime.is_running());

    let base = format!("http://{}", runtime.local_addr());
    let body = reqwest::get(format!("{}/hello", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "backend:/hello");

    let status = reqwest::get(format!("{}/control/status", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let status: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(status["isHealthy"], true);

    runtime.shutdown().await.unwrap();
    assert!(reqwest::get(format!("{}/hello", base)).await.is_err());
}

#[test]
fn test_builder_requires_state_and_upstream() {
    let err = GatewayRuntime::builder().build().err().unwrap();
    assert!(err.to_string().contains("state is required"));

    let ctx = TestContext::interactive(ScriptedProbe::always(true));
    let err = GatewayRuntime::builder().state(ctx.state).build().err().unwrap();
    assert!(err.to_string().contains("upstream is required"));
}
