// Agent entry point
//
// Owns the shared plumbing one process needs: the rate-limited gate with
// its durable page cache, the retry policy, and the cross-ship state the
// router consults (dead-ship registry, fuel-station cache). Everything
// handed out by the agent shares these through `Arc`s, so concurrent ship
// tasks see one gate and one dead-ship set.

use std::sync::Arc;
use std::time::Duration;

use crate::client::api::Api;
use crate::client::gate::Gate;
use crate::client::retry::RetryPolicy;
use crate::client::transport::{HttpTransport, Transport};
use crate::config::Config;
use crate::errors::Result;
use crate::models::responses::AgentData;
use crate::operations::fleet::Fleet;
use crate::storage::dead_ships::DeadShipRegistry;
use crate::storage::page_cache::PageCache;
use crate::storage::station_cache::StationCache;

/// State shared by every ship controller spawned from one agent.
pub struct SharedState {
    pub dead_ships: DeadShipRegistry,
    pub stations: StationCache,
}

pub struct Agent {
    api: Arc<Api>,
    shared: Arc<SharedState>,
}

impl Agent {
    /// Builds an agent against the live API described by the config.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config.token, &config.base_url)?);
        Ok(Self::with_transport(transport, config))
    }

    /// Builds an agent over an arbitrary transport. Used by tests to plug
    /// in synthetic backends.
    pub fn with_transport(transport: Arc<dyn Transport>, config: &Config) -> Self {
        let cache = Arc::new(PageCache::new(&config.cache.path, config.cache.ttl_minutes));
        let gate = Gate::new(transport, cache, Duration::from_millis(config.gate.min_spacing_ms));
        let policy = RetryPolicy {
            max_attempts: config.retry.max_attempts,
            jitter: Duration::from_millis(config.retry.jitter_ms),
        };
        let shared = Arc::new(SharedState {
            dead_ships: DeadShipRegistry::new(),
            stations: StationCache::new(Duration::from_secs(config.cache.station_ttl_minutes * 60)),
        });
        Self { api: Arc::new(Api::new(gate, policy)), shared }
    }

    pub fn api(&self) -> &Arc<Api> {
        &self.api
    }

    pub fn fleet(&self) -> Fleet {
        Fleet::new(Arc::clone(&self.api), Arc::clone(&self.shared))
    }

    /// The agent's remote account details.
    pub async fn details(&self) -> Result<AgentData> {
        self.api.get_agent().await
    }

    /// Symbols of ships proven unable to complete their routes.
    pub fn dead_ships(&self) -> Vec<String> {
        self.shared.dead_ships.symbols()
    }

    pub fn clear_dead_ships(&self) {
        self.shared.dead_ships.clear()
    }
}
