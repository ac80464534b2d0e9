// Decoded `data` payloads of the endpoints the core consumes

use serde::Deserialize;

use crate::models::ship::{ShipCooldown, ShipFuel, ShipNav};
use crate::models::waypoint::Waypoint;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentData {
    pub symbol: String,
    pub headquarters: String,
    pub credits: i64,
    pub starting_faction: String,
}

/// Dock and orbit both answer with just the updated nav block.
#[derive(Debug, Clone, Deserialize)]
pub struct NavUpdate {
    pub nav: ShipNav,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationData {
    pub fuel: ShipFuel,
    pub nav: ShipNav,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefuelData {
    pub fuel: ShipFuel,
    pub transaction: RefuelTransaction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefuelTransaction {
    pub waypoint_symbol: String,
    pub units: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JumpData {
    pub nav: ShipNav,
    pub cooldown: ShipCooldown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartData {
    pub waypoint: Waypoint,
}
