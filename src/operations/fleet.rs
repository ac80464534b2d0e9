// Fleet access
//
// Lists the agent's ships page by page, skipping any ship the router has
// marked dead. The filters return controllers, not raw records, so a caller
// can act on a ship straight out of a listing.

use std::sync::Arc;

use crate::agent::SharedState;
use crate::client::api::Api;
use crate::errors::Result;
use crate::operations::ship::ShipController;

const PAGE_LIMIT: u32 = 20;

pub struct Fleet {
    api: Arc<Api>,
    shared: Arc<SharedState>,
}

impl Fleet {
    pub fn new(api: Arc<Api>, shared: Arc<SharedState>) -> Self {
        Self { api, shared }
    }

    /// Fetch a single ship by symbol. Dead ships can still be fetched
    /// directly; only listings filter them out.
    pub async fn get(&self, ship_symbol: &str) -> Result<ShipController> {
        let ship = self.api.get_ship(&ship_symbol.to_uppercase()).await?;
        Ok(ShipController::new(Arc::clone(&self.api), Arc::clone(&self.shared), ship))
    }

    /// Every ship in the fleet except those in the dead-ship registry.
    pub async fn list(&self) -> Result<Vec<ShipController>> {
        let mut controllers = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.api.get_ships_page(page, PAGE_LIMIT).await?;
            if batch.is_empty() {
                break;
            }
            for ship in batch {
                if self.shared.dead_ships.contains(&ship.symbol) {
                    continue;
                }
                controllers.push(ShipController::new(
                    Arc::clone(&self.api),
                    Arc::clone(&self.shared),
                    ship,
                ));
            }
            page += 1;
        }
        Ok(controllers)
    }

    /// Ships with a probe frame.
    pub async fn probes(&self) -> Result<Vec<ShipController>> {
        let mut ships = self.list().await?;
        ships.retain(|s| s.ship.frame.symbol == "FRAME_PROBE");
        Ok(ships)
    }

    /// Ships with any freighter frame.
    pub async fn freighters(&self) -> Result<Vec<ShipController>> {
        let mut ships = self.list().await?;
        ships.retain(|s| s.ship.frame.symbol.contains("FREIGHTER"));
        Ok(ships)
    }
}
