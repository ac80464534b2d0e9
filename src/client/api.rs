// Endpoint surface consumed by the navigation core
//
// Each method issues one logical remote operation through the retry policy
// and the rate-limited gate, then decodes the response envelope into a
// typed record.

use log::warn;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::client::gate::Gate;
use crate::client::retry::{Decision, RetryPolicy};
use crate::client::transport::{ApiRequest, ApiResponse};
use crate::errors::Result;
use crate::models::market::Market;
use crate::models::responses::{AgentData, ChartData, JumpData, NavUpdate, NavigationData, RefuelData};
use crate::models::ship::{FlightMode, Ship, ShipNav};
use crate::models::waypoint::Waypoint;

/// Optional narrowing of a waypoint listing.
#[derive(Debug, Clone, Default)]
pub struct WaypointFilter {
    pub waypoint_type: Option<String>,
    pub trait_symbol: Option<String>,
}

impl WaypointFilter {
    pub fn of_type(waypoint_type: &str) -> Self {
        Self { waypoint_type: Some(waypoint_type.to_string()), ..Self::default() }
    }

    pub fn with_trait(trait_symbol: &str) -> Self {
        Self { trait_symbol: Some(trait_symbol.to_string()), ..Self::default() }
    }
}

pub struct Api {
    gate: Gate,
    policy: RetryPolicy,
}

impl Api {
    pub fn new(gate: Gate, policy: RetryPolicy) -> Self {
        Self { gate, policy }
    }

    pub fn is_test(&self) -> bool {
        self.gate.is_test()
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Runs one request under the retry policy. Sleeps between attempts are
    /// skipped entirely against a test backend.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.gate.dispatch(request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };
            if attempt >= self.policy.max_attempts {
                return Err(err);
            }
            match self.policy.decide(&err, attempt) {
                Decision::Fail => return Err(err),
                Decision::RetryAfter(wait) => {
                    warn!(
                        "attempt {attempt}/{}: {err}; retrying in {:.1}s",
                        self.policy.max_attempts,
                        wait.as_secs_f64()
                    );
                    if !self.is_test() && !wait.is_zero() {
                        sleep(wait).await;
                    }
                }
            }
        }
    }

    async fn decoded<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.request(request).await?;
        let data = response.body.get("data").cloned().unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub async fn get_agent(&self) -> Result<AgentData> {
        self.decoded(&ApiRequest::get("/my/agent")).await
    }

    pub async fn get_ship(&self, ship_symbol: &str) -> Result<Ship> {
        self.decoded(&ApiRequest::get(format!("/my/ships/{ship_symbol}"))).await
    }

    pub async fn get_ships_page(&self, page: u32, limit: u32) -> Result<Vec<Ship>> {
        let request = ApiRequest::get("/my/ships")
            .with_query("page", page)
            .with_query("limit", limit);
        self.decoded(&request).await
    }

    pub async fn get_waypoints_page(
        &self,
        system_symbol: &str,
        page: u32,
        limit: u32,
        filter: &WaypointFilter,
    ) -> Result<Vec<Waypoint>> {
        let mut request = ApiRequest::get(format!("/systems/{system_symbol}/waypoints"))
            .with_query("page", page)
            .with_query("limit", limit);
        if let Some(waypoint_type) = &filter.waypoint_type {
            request = request.with_query("type", waypoint_type);
        }
        if let Some(trait_symbol) = &filter.trait_symbol {
            request = request.with_query("traits", trait_symbol);
        }
        self.decoded(&request).await
    }

    /// Fetches every page of a waypoint listing.
    pub async fn waypoints(&self, system_symbol: &str, filter: &WaypointFilter) -> Result<Vec<Waypoint>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.get_waypoints_page(system_symbol, page, 20, filter).await?;
            if batch.is_empty() {
                break;
            }
            all.extend(batch);
            page += 1;
        }
        Ok(all)
    }

    pub async fn get_market(&self, system_symbol: &str, waypoint_symbol: &str) -> Result<Market> {
        let path = format!("/systems/{system_symbol}/waypoints/{waypoint_symbol}/market");
        self.decoded(&ApiRequest::get(path)).await
    }

    pub async fn dock_ship(&self, ship_symbol: &str) -> Result<NavUpdate> {
        let path = format!("/my/ships/{ship_symbol}/dock");
        self.decoded(&ApiRequest::post(path, serde_json::json!({}))).await
    }

    pub async fn orbit_ship(&self, ship_symbol: &str) -> Result<NavUpdate> {
        let path = format!("/my/ships/{ship_symbol}/orbit");
        self.decoded(&ApiRequest::post(path, serde_json::json!({}))).await
    }

    pub async fn navigate_ship(&self, ship_symbol: &str, waypoint_symbol: &str) -> Result<NavigationData> {
        let path = format!("/my/ships/{ship_symbol}/navigate");
        let body = serde_json::json!({ "waypointSymbol": waypoint_symbol });
        self.decoded(&ApiRequest::post(path, body)).await
    }

    pub async fn refuel_ship(
        &self,
        ship_symbol: &str,
        units: Option<i64>,
        from_cargo: bool,
    ) -> Result<RefuelData> {
        let path = format!("/my/ships/{ship_symbol}/refuel");
        let mut body = serde_json::json!({ "fromCargo": from_cargo });
        if let Some(units) = units {
            body["units"] = serde_json::json!(units);
        }
        self.decoded(&ApiRequest::post(path, body)).await
    }

    pub async fn set_flight_mode(&self, ship_symbol: &str, mode: FlightMode) -> Result<ShipNav> {
        let path = format!("/my/ships/{ship_symbol}/nav");
        let body = serde_json::json!({ "flightMode": mode.as_str() });
        self.decoded(&ApiRequest::patch(path, body)).await
    }

    pub async fn jump_ship(&self, ship_symbol: &str, waypoint_symbol: &str) -> Result<JumpData> {
        let path = format!("/my/ships/{ship_symbol}/jump");
        let body = serde_json::json!({ "waypointSymbol": waypoint_symbol });
        self.decoded(&ApiRequest::post(path, body)).await
    }

    /// Charts the ship's current waypoint. A successful chart reveals a new
    /// catalog entry, so the cached waypoint pages for that system are
    /// wiped.
    pub async fn chart_waypoint(&self, ship_symbol: &str) -> Result<ChartData> {
        let path = format!("/my/ships/{ship_symbol}/chart");
        let data: ChartData = self.decoded(&ApiRequest::post(path, serde_json::json!({}))).await?;
        let collection = format!("/systems/{}/waypoints", data.waypoint.system_symbol);
        if let Err(err) = self.gate.cache().invalidate_collection(&collection) {
            warn!("failed to invalidate cached pages for {collection}: {err}");
        }
        Ok(data)
    }
}
