use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    pub system_symbol: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub traits: Vec<WaypointTrait>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointTrait {
    pub symbol: String,
}

impl Waypoint {
    pub fn has_trait(&self, trait_symbol: &str) -> bool {
        self.traits.iter().any(|t| t.symbol == trait_symbol)
    }
}

/// Euclidean distance between two waypoints.
pub fn distance_between(a: &Waypoint, b: &Waypoint) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}
