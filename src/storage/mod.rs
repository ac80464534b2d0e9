pub mod dead_ships;
pub mod page_cache;
pub mod station_cache;

pub use dead_ships::DeadShipRegistry;
pub use page_cache::{PageCache, PageKey};
pub use station_cache::StationCache;
