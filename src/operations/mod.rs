pub mod autopilot;
pub mod fleet;
pub mod guards;
pub mod ship;

pub use fleet::Fleet;
pub use guards::Preconditions;
pub use ship::ShipController;
