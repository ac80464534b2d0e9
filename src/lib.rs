// Resilient SpaceTraders client library
// Rate-limited request gate, typed faults, cached reads, fuel-aware autopilot

pub mod agent;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod operations;
pub mod storage;

// Re-export commonly used types
pub use models::{
    ship::{FlightMode, NavStatus, Ship, ShipCooldown, ShipFuel, ShipNav},
    waypoint::Waypoint,
    responses::*,
};

pub use agent::{Agent, SharedState};
pub use client::{Api, ApiRequest, ApiResponse, Gate, HttpTransport, RetryPolicy, Transport, Verb};
pub use config::Config;
pub use errors::{ApiFault, Error, FaultKind, Result};
pub use operations::{Fleet, Preconditions, ShipController};

// Constants
pub const API_BASE_URL: &str = "https://api.spacetraders.io/v2";

/// Sentinel token that switches the client into deterministic test mode:
/// no rate-limit spacing, no retry sleeps, no durable caching.
pub const TESTING_TOKEN: &str = "TESTING_TOKEN";
