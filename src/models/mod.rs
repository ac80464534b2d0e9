pub mod market;
pub mod responses;
pub mod ship;
pub mod waypoint;

pub use market::{Market, TradeGood};
pub use responses::*;
pub use ship::{FlightMode, NavStatus, Ship, ShipCooldown, ShipFuel, ShipNav};
pub use waypoint::{Waypoint, WaypointTrait};
