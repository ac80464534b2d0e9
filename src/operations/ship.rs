// Guarded ship primitives
//
// Each action runs its precondition pipeline first, then issues the remote
// call and folds the server's response back into the local ship record.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use log::{info, warn};

use crate::agent::SharedState;
use crate::client::api::{Api, WaypointFilter};
use crate::errors::Result;
use crate::models::responses::RefuelTransaction;
use crate::models::ship::{FlightMode, Ship};
use crate::models::waypoint::Waypoint;
use crate::operations::guards::Preconditions;

pub struct ShipController {
    pub(crate) api: Arc<Api>,
    pub(crate) shared: Arc<SharedState>,
    pub ship: Ship,
}

impl ShipController {
    pub fn new(api: Arc<Api>, shared: Arc<SharedState>, ship: Ship) -> Self {
        Self { api, shared, ship }
    }

    pub fn symbol(&self) -> &str {
        &self.ship.symbol
    }

    /// Dock at the current waypoint. Blocks until any in-flight period has
    /// passed; does nothing when already docked.
    pub async fn dock(&mut self) -> Result<()> {
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().docked().ensure(&api, &mut self.ship).await
    }

    /// Move to orbit at the current waypoint; no-op when already orbiting.
    pub async fn orbit(&mut self) -> Result<()> {
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().orbit().ensure(&api, &mut self.ship).await
    }

    /// Navigate to a waypoint in the current system. Returns without a call
    /// when the ship is already there.
    pub async fn navigate(&mut self, waypoint: &Waypoint) -> Result<()> {
        if self.ship.nav.waypoint_symbol == waypoint.symbol {
            return Ok(());
        }
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().orbit().ensure(&api, &mut self.ship).await?;
        let data = api.navigate_ship(&self.ship.symbol, &waypoint.symbol).await?;
        self.ship.fuel = data.fuel;
        self.ship.nav = data.nav;
        info!(
            "{}: {} | navigating to {} via {}, arriving in {:.1}m",
            self.ship.registration.role,
            self.ship.symbol,
            waypoint.symbol,
            self.ship.nav.flight_mode,
            self.ship.arrival_seconds() / 60.0
        );
        Ok(())
    }

    /// Refill the fuel tank completely.
    pub async fn refuel(&mut self) -> Result<Option<RefuelTransaction>> {
        self.refuel_with(0, false).await
    }

    /// Refuel and swallow any failure. Used where refueling is
    /// opportunistic and a missing fuel seller is not an error.
    pub async fn try_refuel(&mut self) {
        if let Err(err) = self.refuel().await {
            warn!(
                "{}: {} | failed to refuel at {}: {err}",
                self.ship.registration.role, self.ship.symbol, self.ship.nav.waypoint_symbol
            );
        }
    }

    /// Refuel `units` (0 = fill the tank), optionally from cargo. A full
    /// tank is a no-op before any docking happens.
    pub async fn refuel_with(&mut self, units: i64, from_cargo: bool) -> Result<Option<RefuelTransaction>> {
        if self.ship.fuel.current == self.ship.fuel.capacity {
            return Ok(None);
        }
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().docked().ensure(&api, &mut self.ship).await?;
        let data = api
            .refuel_ship(&self.ship.symbol, (units >= 1).then_some(units), from_cargo)
            .await?;
        self.ship.fuel = data.fuel;
        if from_cargo {
            self.consume_cargo_fuel(data.transaction.units);
        }
        info!(
            "{}: {} | refueled {} units at {} for ${}",
            self.ship.registration.role,
            self.ship.symbol,
            data.transaction.units,
            data.transaction.waypoint_symbol,
            data.transaction.total_price
        );
        Ok(Some(data.transaction))
    }

    fn consume_cargo_fuel(&mut self, units: i64) {
        let cargo = &mut self.ship.cargo;
        for item in &mut cargo.inventory {
            if item.symbol == "FUEL" {
                item.units -= units;
                cargo.units -= units;
            }
        }
        cargo.inventory.retain(|item| item.units > 0);
    }

    /// Switch flight mode; skips the call when the mode is unchanged.
    pub async fn set_flight_mode(&mut self, mode: FlightMode) -> Result<()> {
        if self.ship.nav.flight_mode == mode {
            return Ok(());
        }
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().ensure(&api, &mut self.ship).await?;
        let previous = self.ship.nav.flight_mode;
        let nav = api.set_flight_mode(&self.ship.symbol, mode).await?;
        self.ship.nav = nav;
        info!(
            "{}: {} | changing flight mode from {previous} to {mode}",
            self.ship.registration.role, self.ship.symbol
        );
        Ok(())
    }

    /// Jump through the gate at the current waypoint. Waits out transit and
    /// cooldown, orbits, then jumps; the resulting cooldown is recorded
    /// locally so the next guarded action waits for it.
    pub async fn jump(&mut self, waypoint: &Waypoint) -> Result<()> {
        let api = Arc::clone(&self.api);
        Preconditions::new()
            .transit()
            .cooldown()
            .orbit()
            .ensure(&api, &mut self.ship)
            .await?;
        let data = api.jump_ship(&self.ship.symbol, &waypoint.symbol).await?;
        self.ship.nav = data.nav;
        self.ship.cooldown = data.cooldown;
        info!(
            "{}: {} | jumped to {}",
            self.ship.registration.role, self.ship.symbol, waypoint.symbol
        );
        Ok(())
    }

    /// Chart the current waypoint. The api layer wipes the system's cached
    /// waypoint pages on success.
    pub async fn chart(&mut self) -> Result<Waypoint> {
        let api = Arc::clone(&self.api);
        Preconditions::new().transit().ensure(&api, &mut self.ship).await?;
        let data = api.chart_waypoint(&self.ship.symbol).await?;
        info!(
            "{}: {} | charted {}",
            self.ship.registration.role, self.ship.symbol, data.waypoint.symbol
        );
        Ok(data.waypoint)
    }

    pub fn distance_to(&self, waypoint: &Waypoint) -> f64 {
        self.ship.distance_to(waypoint)
    }

    /// The candidate closest to the ship, by raw distance.
    pub fn closest<'a, I>(&self, candidates: I) -> Option<&'a Waypoint>
    where
        I: IntoIterator<Item = &'a Waypoint>,
    {
        candidates.into_iter().min_by(|a, b| {
            self.distance_to(a)
                .partial_cmp(&self.distance_to(b))
                .unwrap_or(Ordering::Equal)
        })
    }

    /// The candidate farthest from the ship, by raw distance.
    pub fn farthest<'a, I>(&self, candidates: I) -> Option<&'a Waypoint>
    where
        I: IntoIterator<Item = &'a Waypoint>,
    {
        candidates.into_iter().max_by(|a, b| {
            self.distance_to(a)
                .partial_cmp(&self.distance_to(b))
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Every waypoint in the ship's system where fuel can be bought:
    /// dedicated fuel stations plus any marketplace exporting or exchanging
    /// fuel. Building this walks the market of every marketplace waypoint,
    /// so the result is cached process-wide per system and concurrent
    /// lookups are serialized: the build lock is held from the cache check
    /// through the insert, so a second caller waits and hits the cache
    /// instead of repeating the walk.
    pub async fn fuel_stations(&self) -> Result<Vec<Waypoint>> {
        let system = self.ship.nav.system_symbol.clone();
        if self.api.is_test() {
            return self.build_fuel_stations(&system).await;
        }

        let _build = self.shared.stations.begin_build().await;
        if let Some(cached) = self.shared.stations.get(&system) {
            return Ok(cached);
        }
        let stations = self.build_fuel_stations(&system).await?;
        self.shared.stations.insert(&system, stations.clone());
        Ok(stations)
    }

    async fn build_fuel_stations(&self, system: &str) -> Result<Vec<Waypoint>> {
        let mut stations: Vec<Waypoint> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for waypoint in self.api.waypoints(system, &WaypointFilter::of_type("FUEL_STATION")).await? {
            if seen.insert(waypoint.symbol.clone()) {
                stations.push(waypoint);
            }
        }
        for waypoint in self.api.waypoints(system, &WaypointFilter::with_trait("MARKETPLACE")).await? {
            if seen.contains(&waypoint.symbol) {
                continue;
            }
            let market = self.api.get_market(system, &waypoint.symbol).await?;
            if market.trades_fuel() {
                seen.insert(waypoint.symbol.clone());
                stations.push(waypoint);
            }
        }
        Ok(stations)
    }

    /// The nearest waypoint selling fuel, if the system has any.
    pub async fn closest_fuel(&self) -> Result<Option<Waypoint>> {
        let stations = self.fuel_stations().await?;
        Ok(self.closest(&stations).cloned())
    }
}
