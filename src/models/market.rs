use serde::Deserialize;

/// Market data is always fetched live; trade volumes go stale too fast for
/// the page cache, so this resource is never cache-eligible.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub symbol: String,
    #[serde(default)]
    pub exports: Vec<TradeGood>,
    #[serde(default)]
    pub imports: Vec<TradeGood>,
    #[serde(default)]
    pub exchange: Vec<TradeGood>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeGood {
    pub symbol: String,
}

impl Market {
    /// Whether fuel can be bought here, either exported or exchanged.
    pub fn trades_fuel(&self) -> bool {
        self.exports.iter().chain(&self.exchange).any(|good| good.symbol == "FUEL")
    }
}
