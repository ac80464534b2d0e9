mod common;

use std::sync::Arc;

use serde_json::json;

use common::{data_response, fault_response, fault_response_with, make_api, FakeTransport};

fn agent_payload() -> serde_json::Value {
    json!({
        "symbol": "AGENT-1",
        "headquarters": "X1-A1",
        "credits": 175000,
        "startingFaction": "COSMIC",
    })
}

#[tokio::test]
async fn unclassified_faults_exhaust_the_attempt_budget() {
    let transport = Arc::new(FakeTransport::new());
    transport.script("GET /my/agent", vec![fault_response(9999, "who knows")]);
    let dir = tempfile::tempdir().unwrap();
    let api = make_api(Arc::clone(&transport), &dir);

    let err = api.get_agent().await.unwrap_err();
    assert!(err.fault_kind().is_some());
    assert_eq!(transport.call_count("GET /my/agent"), 5);
}

#[tokio::test]
async fn typed_faults_surface_immediately() {
    let transport = Arc::new(FakeTransport::new());
    transport.script(
        "POST /my/ships/S-1/navigate",
        vec![fault_response(4203, "not enough fuel")],
    );
    let dir = tempfile::tempdir().unwrap();
    let api = make_api(Arc::clone(&transport), &dir);

    let err = api.navigate_ship("S-1", "X1-B2").await.unwrap_err();
    assert!(err.is_insufficient_fuel());
    assert_eq!(transport.call_count("POST /my/ships/S-1/navigate"), 1);
}

#[tokio::test]
async fn transient_fault_then_success() {
    let transport = Arc::new(FakeTransport::new());
    transport.script(
        "GET /my/agent",
        vec![fault_response(9999, "hiccup"), data_response(agent_payload())],
    );
    let dir = tempfile::tempdir().unwrap();
    let api = make_api(Arc::clone(&transport), &dir);

    let agent = api.get_agent().await.unwrap();
    assert_eq!(agent.symbol, "AGENT-1");
    assert_eq!(transport.call_count("GET /my/agent"), 2);
}

#[tokio::test]
async fn cooldown_hint_is_retried_not_surfaced() {
    let transport = Arc::new(FakeTransport::new());
    transport.script(
        "GET /my/agent",
        vec![
            fault_response_with(4000, "on cooldown", json!({"cooldown": {"remainingSeconds": 3.0}})),
            data_response(agent_payload()),
        ],
    );
    let dir = tempfile::tempdir().unwrap();
    let api = make_api(Arc::clone(&transport), &dir);

    // Against a test backend the hinted sleep is skipped, so this returns
    // immediately after the second attempt.
    let agent = api.get_agent().await.unwrap();
    assert_eq!(agent.credits, 175000);
    assert_eq!(transport.call_count("GET /my/agent"), 2);
}
