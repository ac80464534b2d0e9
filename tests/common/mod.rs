// Shared test harness: a scripted transport plus JSON builders for the
// records the client decodes. Responses are queued per "VERB path" key;
// the final queued response repeats, which makes pagination termination
// and persistent failures natural to script.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use spacelane::agent::SharedState;
use spacelane::client::api::Api;
use spacelane::client::gate::Gate;
use spacelane::client::retry::RetryPolicy;
use spacelane::client::transport::{ApiRequest, ApiResponse, Transport, Verb};
use spacelane::errors::Result;
use spacelane::storage::{DeadShipRegistry, PageCache, StationCache};

pub struct FakeTransport {
    responses: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    calls: Mutex<Vec<String>>,
    test_mode: bool,
}

impl FakeTransport {
    /// A transport in test mode: upstream layers skip all sleeps.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            test_mode: true,
        }
    }

    /// A transport that reports itself as live, for exercising the spacing
    /// and caching paths the test mode disables.
    pub fn live() -> Self {
        Self { test_mode: false, ..Self::new() }
    }

    /// Queues responses for one endpoint. When the queue is down to its
    /// last response, that response is served forever.
    pub fn script(&self, key: &str, responses: Vec<ApiResponse>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), responses.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == key).count()
    }
}

fn verb_name(verb: Verb) -> &'static str {
    match verb {
        Verb::Get => "GET",
        Verb::Post => "POST",
        Verb::Put => "PUT",
        Verb::Patch => "PATCH",
        Verb::Delete => "DELETE",
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let key = format!("{} {}", verb_name(request.verb), request.path);
        self.calls.lock().unwrap().push(key.clone());
        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no scripted response for {key}"));
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue.front().cloned().unwrap_or_else(|| panic!("empty script for {key}")))
        }
    }

    fn is_test(&self) -> bool {
        self.test_mode
    }
}

pub fn data_response(data: Value) -> ApiResponse {
    ApiResponse { status: 200, body: json!({ "data": data }) }
}

pub fn fault_response(code: i64, message: &str) -> ApiResponse {
    fault_response_with(code, message, json!({}))
}

pub fn fault_response_with(code: i64, message: &str, data: Value) -> ApiResponse {
    ApiResponse {
        status: 400,
        body: json!({ "error": { "code": code, "message": message, "data": data } }),
    }
}

pub fn make_api(transport: Arc<FakeTransport>, dir: &TempDir) -> Arc<Api> {
    let _ = env_logger::builder().is_test(true).try_init();
    let cache = Arc::new(PageCache::new(dir.path().join("pages.json"), 15));
    let gate = Gate::new(transport, cache, Duration::from_millis(1));
    Arc::new(Api::new(gate, RetryPolicy::default()))
}

pub fn make_shared() -> Arc<SharedState> {
    Arc::new(SharedState {
        dead_ships: DeadShipRegistry::new(),
        stations: StationCache::new(Duration::from_secs(900)),
    })
}

pub fn nav_json(system: &str, waypoint: &str, status: &str, mode: &str, x: i64, y: i64) -> Value {
    let endpoint = json!({
        "symbol": waypoint,
        "type": "PLANET",
        "systemSymbol": system,
        "x": x,
        "y": y,
    });
    json!({
        "systemSymbol": system,
        "waypointSymbol": waypoint,
        "route": {
            "destination": endpoint,
            "origin": endpoint,
            "departureTime": "2020-01-01T00:00:00Z",
            "arrival": "2020-01-01T00:00:10Z",
        },
        "status": status,
        "flightMode": mode,
    })
}

pub fn ship_json(symbol: &str, nav: Value, fuel_current: i64, fuel_capacity: i64) -> Value {
    json!({
        "symbol": symbol,
        "registration": {
            "name": symbol,
            "factionSymbol": "COSMIC",
            "role": "HAULER",
        },
        "nav": nav,
        "cooldown": {
            "shipSymbol": symbol,
            "totalSeconds": 0,
            "remainingSeconds": 0,
            "expiration": null,
        },
        "fuel": { "current": fuel_current, "capacity": fuel_capacity },
        "frame": { "symbol": "FRAME_LIGHT_FREIGHTER" },
        "cargo": { "capacity": 40, "units": 0, "inventory": [] },
    })
}

pub fn waypoint_json(symbol: &str, system: &str, waypoint_type: &str, x: i64, y: i64) -> Value {
    json!({
        "symbol": symbol,
        "type": waypoint_type,
        "systemSymbol": system,
        "x": x,
        "y": y,
        "traits": [],
    })
}

pub fn refuel_response(waypoint: &str, units: i64, capacity: i64) -> ApiResponse {
    data_response(json!({
        "fuel": { "current": capacity, "capacity": capacity },
        "transaction": {
            "waypointSymbol": waypoint,
            "units": units,
            "totalPrice": units * 72,
        },
    }))
}
