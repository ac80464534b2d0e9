// Process-wide set of ships proven unable to complete their route
//
// Only the autopilot adds entries, always right before it raises its
// terminal insufficient-fuel fault. Nothing removes entries automatically;
// fleet iteration skips dead ships until the caller clears the registry.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct DeadShipRegistry {
    ships: Mutex<HashSet<String>>,
}

impl DeadShipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, ship_symbol: &str) {
        let mut ships = self.ships.lock().expect("dead ship lock poisoned");
        ships.insert(ship_symbol.to_string());
    }

    pub fn contains(&self, ship_symbol: &str) -> bool {
        let ships = self.ships.lock().expect("dead ship lock poisoned");
        ships.contains(ship_symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        let ships = self.ships.lock().expect("dead ship lock poisoned");
        ships.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.ships.lock().expect("dead ship lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_clears() {
        let registry = DeadShipRegistry::new();
        assert!(!registry.contains("SHIP-1"));
        registry.mark("SHIP-1");
        registry.mark("SHIP-1");
        assert!(registry.contains("SHIP-1"));
        assert_eq!(registry.symbols(), vec!["SHIP-1".to_string()]);
        registry.clear();
        assert!(!registry.contains("SHIP-1"));
    }
}
