// In-process cache of fuel-station candidates per system
//
// Building the list walks every waypoint page plus each marketplace in the
// system, which is network-expensive, so concurrent autopilot runs in the
// same system share one lookup. A builder must hold `begin_build` from the
// cache check through the insert; the entry map itself is locked only for
// the duration of each call.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::waypoint::Waypoint;

struct StationEntry {
    stations: Vec<Waypoint>,
    inserted_at: Instant,
}

pub struct StationCache {
    ttl: Duration,
    build_lock: tokio::sync::Mutex<()>,
    entries: Mutex<HashMap<String, StationEntry>>,
}

impl StationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            build_lock: tokio::sync::Mutex::new(()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Serializes expensive builds. Callers hold the returned guard across
    /// the check-then-insert sequence so a concurrent caller waits and
    /// then hits the freshly inserted entry instead of rebuilding it.
    pub async fn begin_build(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.build_lock.lock().await
    }

    pub fn get(&self, system: &str) -> Option<Vec<Waypoint>> {
        let entries = self.entries.lock().expect("station cache lock poisoned");
        let entry = entries.get(system)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.stations.clone())
    }

    pub fn insert(&self, system: &str, stations: Vec<Waypoint>) {
        let mut entries = self.entries.lock().expect("station cache lock poisoned");
        entries.insert(
            system.to_string(),
            StationEntry { stations, inserted_at: Instant::now() },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().expect("station cache lock poisoned").clear();
    }
}
