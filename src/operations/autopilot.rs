// Fuel-aware multi-hop routing
//
// The router composes the guarded primitives into a loop that walks a ship
// to a destination it cannot reach directly: retry the direct leg, detour
// through fuel stations ranked by distance to the destination, drop to
// DRIFT when cruisable options run out, and mark the ship dead when even
// drifting cannot get it anywhere useful.

use log::{info, warn};

use crate::errors::{Error, Result};
use crate::models::ship::{FlightMode, NavStatus};
use crate::models::waypoint::{distance_between, Waypoint};
use crate::operations::ship::ShipController;

/// Invoked after a successful run, before control returns to the caller.
pub type DoneCallback = Box<dyn FnOnce() + Send>;

impl ShipController {
    /// Navigates the ship to the destination, refueling and downgrading the
    /// flight mode along the way as needed. Blocks until the ship arrives
    /// or the route is proven impossible.
    ///
    /// Intermediate failures are logged and absorbed; the only error a
    /// caller sees is a terminal insufficient-fuel fault, at which point the
    /// ship has also been recorded in the dead-ship registry and will be
    /// skipped by future fleet iteration.
    pub async fn autopilot(
        &mut self,
        waypoint: &Waypoint,
        flight_mode: FlightMode,
        done_callback: Option<DoneCallback>,
    ) -> Result<()> {
        if self.ship.nav.waypoint_symbol == waypoint.symbol {
            return Ok(());
        }
        // Claim the ship for this run before the first remote call lands.
        self.ship.nav.status = NavStatus::InTransit;
        self.set_flight_mode(flight_mode).await?;
        self.try_refuel().await;
        self.orbit().await?;

        // Reachable as-is, nothing more to plan.
        if self.try_navigate(waypoint).await.is_none() {
            return self.finish(done_callback).await;
        }

        let mut candidates = self.fuel_stations().await?;
        candidates.sort_by(|a, b| {
            distance_between(waypoint, a).total_cmp(&distance_between(waypoint, b))
        });
        let mut last_successful_fueling = candidates.len() + 1;

        while self.try_navigate(waypoint).await.is_some() {
            let mut fuel_index = 0;
            let Some(mut next_fuel) = candidates.first().cloned() else {
                if self.ship.nav.flight_mode == FlightMode::Drift {
                    return Err(self.mark_dead("no fuel stations in system"));
                }
                self.set_flight_mode(FlightMode::Drift).await?;
                continue;
            };
            if self.ship.nav.waypoint_symbol == next_fuel.symbol {
                self.try_refuel().await;
                if self.ship.nav.flight_mode == FlightMode::Drift {
                    return Err(self.mark_dead(r"¯\_(ツ)_/¯"));
                }
                info!(
                    "{}: {} | already at closest fuel but cannot make it to {} at {}, will now DRIFT",
                    self.ship.registration.role,
                    self.ship.symbol,
                    waypoint.symbol,
                    self.ship.nav.flight_mode
                );
                self.set_flight_mode(FlightMode::Drift).await?;
                continue;
            }
            let mut walked_out = true;
            while self.try_navigate(&next_fuel).await.is_some() {
                fuel_index += 1;
                if fuel_index >= last_successful_fueling {
                    // The ship can reach the closest station to the
                    // destination but not the destination itself; without a
                    // mode switch it would cycle stations forever.
                    if self.ship.nav.flight_mode == FlightMode::Drift {
                        return match self.try_navigate(waypoint).await {
                            Some(err) => {
                                warn!("{}: {} | {err}", self.ship.registration.role, self.ship.symbol);
                                Err(self.mark_dead("destination out of range"))
                            }
                            None => self.finish_arrival(done_callback).await,
                        };
                    }
                    info!(
                        "{}: {} | at last successful fuel stop, will now DRIFT",
                        self.ship.registration.role, self.ship.symbol
                    );
                    self.set_flight_mode(FlightMode::Drift).await?;
                    walked_out = false;
                    break;
                }
                match candidates.get(fuel_index) {
                    Some(station) => {
                        next_fuel = station.clone();
                        info!(
                            "{}: {} | trying next fuel station {} ({}/{})",
                            self.ship.registration.role,
                            self.ship.symbol,
                            next_fuel.symbol,
                            fuel_index,
                            candidates.len()
                        );
                    }
                    None => {
                        if self.ship.nav.flight_mode == FlightMode::Drift {
                            return match self.try_navigate(waypoint).await {
                                Some(err) => {
                                    warn!(
                                        "{}: {} | {err}",
                                        self.ship.registration.role, self.ship.symbol
                                    );
                                    Err(self.mark_dead("no reachable fuel"))
                                }
                                None => self.finish_arrival(done_callback).await,
                            };
                        }
                        if self.ship.fuel.current + 5 >= self.ship.fuel.capacity {
                            // A near-full tank that reaches no station will
                            // not be helped by topping up; drift instead.
                            self.set_flight_mode(FlightMode::Drift).await?;
                        } else {
                            // May have started with a mostly empty tank.
                            warn!(
                                "{}: {} | no cruisable fuel stations, now drifting",
                                self.ship.registration.role, self.ship.symbol
                            );
                            self.set_flight_mode(FlightMode::Drift).await?;
                            let Some(closest) = self.closest_fuel().await? else {
                                return Err(self.mark_dead("no fuel stations in system"));
                            };
                            if let Some(err) = self.try_navigate(&closest).await {
                                warn!(
                                    "{}: {} | {err}",
                                    self.ship.registration.role, self.ship.symbol
                                );
                                return Err(self.mark_dead("no reachable fuel"));
                            }
                            self.refuel().await?;
                            self.set_flight_mode(FlightMode::Cruise).await?;
                        }
                        walked_out = false;
                        break;
                    }
                }
            }
            if walked_out {
                // Reached a station; later rounds need not re-walk the
                // stretch beyond it.
                last_successful_fueling = fuel_index;
            }
            self.try_refuel().await;
        }
        self.finish(done_callback).await
    }

    /// Navigate without surfacing the failure, returning it for the router
    /// to branch on instead.
    async fn try_navigate(&mut self, waypoint: &Waypoint) -> Option<Error> {
        match self.navigate(waypoint).await {
            Ok(()) => None,
            Err(err) => {
                info!(
                    "{}: {} | could not reach {}: {err}",
                    self.ship.registration.role, self.ship.symbol, waypoint.symbol
                );
                Some(err)
            }
        }
    }

    async fn finish(&mut self, done_callback: Option<DoneCallback>) -> Result<()> {
        self.try_refuel().await;
        self.finish_arrival(done_callback).await
    }

    async fn finish_arrival(&mut self, done_callback: Option<DoneCallback>) -> Result<()> {
        self.orbit().await?;
        if let Some(callback) = done_callback {
            callback();
        }
        Ok(())
    }

    /// Records the ship as unable to complete its route and produces the
    /// terminal fault the caller receives.
    fn mark_dead(&self, message: &str) -> Error {
        self.shared.dead_ships.mark(&self.ship.symbol);
        warn!(
            "{}: {} | marked dead: {message}",
            self.ship.registration.role, self.ship.symbol
        );
        Error::insufficient_fuel(message)
    }
}
