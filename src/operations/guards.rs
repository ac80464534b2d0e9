// Precondition guards
//
// Actions that require a specific ship state declare an ordered pipeline of
// corrective steps that runs before the action. Ordering is an invariant,
// not a convenience: the transit wait must run before the cooldown wait,
// because a ship that is still flying cannot act on anything, and before
// any dock/orbit transition, because those calls are rejected mid-flight.
// Guards absorb waits as blocking delays; they never surface them as
// errors, so the wrapped action always executes in a satisfying state.

use std::time::Duration;

use log::info;
use tokio::time::sleep;

use crate::client::api::Api;
use crate::errors::Result;
use crate::models::ship::{NavStatus, Ship};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitTransit,
    AwaitCooldown,
    EnsureOrbit,
    EnsureDocked,
}

/// Ordered precondition pipeline. Steps run in the order they were added.
#[derive(Debug, Default)]
pub struct Preconditions {
    steps: Vec<Step>,
}

impl Preconditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait out an in-flight period, then mark the ship arrived.
    pub fn transit(mut self) -> Self {
        self.steps.push(Step::AwaitTransit);
        self
    }

    /// Wait out an active cooldown.
    pub fn cooldown(mut self) -> Self {
        self.steps.push(Step::AwaitCooldown);
        self
    }

    /// Move to orbit unless already orbiting.
    pub fn orbit(mut self) -> Self {
        self.steps.push(Step::EnsureOrbit);
        self
    }

    /// Dock unless already docked.
    pub fn docked(mut self) -> Self {
        self.steps.push(Step::EnsureDocked);
        self
    }

    pub async fn ensure(&self, api: &Api, ship: &mut Ship) -> Result<()> {
        for step in &self.steps {
            match step {
                Step::AwaitTransit => {
                    if ship.nav.status == NavStatus::InTransit {
                        let wait = ship.arrival_seconds();
                        if wait > 0.0 {
                            info!("{} | waiting {wait:.0}s for arrival", ship.symbol);
                            sleep(Duration::from_secs_f64(wait)).await;
                        }
                        ship.arrived();
                    }
                }
                Step::AwaitCooldown => {
                    let wait = ship.cooldown_seconds();
                    if wait > 0.0 {
                        info!("{} | waiting {wait:.0}s for cooldown", ship.symbol);
                        sleep(Duration::from_secs_f64(wait)).await;
                    }
                }
                Step::EnsureOrbit => {
                    if ship.nav.status != NavStatus::InOrbit {
                        let update = api.orbit_ship(&ship.symbol).await?;
                        ship.nav = update.nav;
                        info!("{}: {} | moved to orbit", ship.registration.role, ship.symbol);
                    }
                }
                Step::EnsureDocked => {
                    if ship.nav.status != NavStatus::Docked {
                        let update = api.dock_ship(&ship.symbol).await?;
                        ship.nav = update.nav;
                        info!(
                            "{}: {} | docked at {}",
                            ship.registration.role, ship.symbol, ship.nav.waypoint_symbol
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
