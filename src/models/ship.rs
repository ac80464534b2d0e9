use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::models::waypoint::Waypoint;

/// A ship owned by the agent. Mutated only through guarded actions that fold
/// the server's response back into this record, so guard checks see fresh
/// state without another round trip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub symbol: String,
    pub registration: ShipRegistration,
    pub nav: ShipNav,
    pub cooldown: ShipCooldown,
    pub fuel: ShipFuel,
    pub frame: ShipFrame,
    pub cargo: ShipCargo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRegistration {
    pub name: String,
    pub faction_symbol: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipNav {
    pub system_symbol: String,
    pub waypoint_symbol: String,
    pub route: ShipRoute,
    pub status: NavStatus,
    pub flight_mode: FlightMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRoute {
    pub destination: RouteWaypoint,
    pub origin: RouteWaypoint,
    pub departure_time: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWaypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    pub system_symbol: String,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavStatus {
    Docked,
    InOrbit,
    InTransit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightMode {
    Cruise,
    Drift,
    Stealth,
    Burn,
}

impl FlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightMode::Cruise => "CRUISE",
            FlightMode::Drift => "DRIFT",
            FlightMode::Stealth => "STEALTH",
            FlightMode::Burn => "BURN",
        }
    }
}

impl std::str::FromStr for FlightMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRUISE" => Ok(FlightMode::Cruise),
            "DRIFT" => Ok(FlightMode::Drift),
            "STEALTH" => Ok(FlightMode::Stealth),
            "BURN" => Ok(FlightMode::Burn),
            other => Err(Error::InvalidFlightMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for FlightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCooldown {
    pub ship_symbol: String,
    pub total_seconds: i64,
    pub remaining_seconds: i64,
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipFuel {
    pub current: i64,
    pub capacity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipFrame {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipCargo {
    pub capacity: i64,
    pub units: i64,
    pub inventory: Vec<CargoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CargoItem {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub units: i64,
}

impl Ship {
    /// Seconds until the ship reaches its destination; 0 unless in transit.
    pub fn arrival_seconds(&self) -> f64 {
        if self.nav.status != NavStatus::InTransit {
            return 0.0;
        }
        let delta = self.nav.route.arrival - Utc::now();
        delta.num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Seconds until the active cooldown expires; 0 when none is active.
    pub fn cooldown_seconds(&self) -> f64 {
        let Some(expiration) = self.cooldown.expiration else {
            return 0.0;
        };
        let delta = expiration - Utc::now();
        delta.num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Marks the ship arrived at its destination (local state only).
    pub fn arrived(&mut self) {
        self.nav.status = NavStatus::InOrbit;
    }

    /// Distance from the ship to a waypoint, measured from the ship's
    /// current route destination the way the server does.
    pub fn distance_to(&self, waypoint: &Waypoint) -> f64 {
        let dx = (self.nav.route.destination.x - waypoint.x) as f64;
        let dy = (self.nav.route.destination.y - waypoint.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_mode_parses_case_insensitively() {
        assert_eq!("drift".parse::<FlightMode>().unwrap(), FlightMode::Drift);
        assert_eq!(" CRUISE ".parse::<FlightMode>().unwrap(), FlightMode::Cruise);
        assert!(matches!(
            "WARP".parse::<FlightMode>(),
            Err(Error::InvalidFlightMode(_))
        ));
    }

    #[test]
    fn flight_mode_round_trips_through_display() {
        for mode in [FlightMode::Cruise, FlightMode::Drift, FlightMode::Stealth, FlightMode::Burn] {
            assert_eq!(mode.to_string().parse::<FlightMode>().unwrap(), mode);
        }
    }
}
