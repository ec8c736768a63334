//! Commodity and the market-facing resource wrapper shared by every catalog
//! entry.

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::formulas::round2;
use crate::{Category, ProductionStageKind, ResourceMap};

/// Entries kept in a resource's price history.
pub const PRICE_HISTORY_CAP: usize = 50;

/// Entries considered by [`Resource::price_trend`].
const PRICE_TREND_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    pub id: u32,
    pub name: String,
    pub category: Category,
    pub base_price: f64,
    pub price_volatility: f64,
    #[serde(default)]
    pub volatility_range: (f64, f64),
    #[serde(default)]
    pub description: String,
    pub volume_per_unit: f64,
    pub mass_per_unit: f64,
}

fn neutral_multiplier() -> f64 {
    1.0
}

/// A commodity placed in the production chain, with market multipliers and
/// a bounded `(timestamp, price)` history.
///
/// Equality and hashing use the commodity id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub commodity: Commodity,
    pub production_stage: ProductionStageKind,
    #[serde(default = "neutral_multiplier")]
    pub market_demand: f64,
    #[serde(default = "neutral_multiplier")]
    pub market_supply: f64,
    #[serde(default)]
    price_history: VecDeque<(f64, f64)>,
}

impl Resource {
    pub fn new(commodity: Commodity, production_stage: ProductionStageKind) -> Self {
        Self {
            commodity,
            production_stage,
            market_demand: 1.0,
            market_supply: 1.0,
            price_history: VecDeque::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.commodity.id
    }

    pub fn name(&self) -> &str {
        &self.commodity.name
    }

    pub fn category(&self) -> Category {
        self.commodity.category
    }

    pub fn base_value(&self) -> f64 {
        self.commodity.base_price
    }

    pub fn volume(&self) -> f64 {
        self.commodity.volume_per_unit
    }

    pub fn mass(&self) -> f64 {
        self.commodity.mass_per_unit
    }

    /// Unmodified value; catalog types layer their tier multipliers on top.
    pub fn value(&self) -> f64 {
        round2(self.commodity.base_price)
    }

    /// Price after supply/demand pressure (clamped to 0.5–2.0×) and a
    /// station-specific modifier. `value` is the tier-adjusted value of the
    /// owning catalog entry.
    pub fn market_price(&self, value: f64, market_modifier: f64) -> f64 {
        let pressure = if self.market_supply > 0.0 {
            self.market_demand / self.market_supply
        } else {
            2.0
        };
        round2(value * pressure.clamp(0.5, 2.0) * market_modifier)
    }

    pub fn update_price_history(&mut self, timestamp: f64, price: f64) {
        self.price_history.push_back((timestamp, price));
        while self.price_history.len() > PRICE_HISTORY_CAP {
            self.price_history.pop_front();
        }
    }

    pub fn price_history(&self) -> &VecDeque<(f64, f64)> {
        &self.price_history
    }

    /// Relative change across the recent window, in [-1, 1].
    pub fn price_trend(&self) -> f64 {
        let len = self.price_history.len();
        if len < 2 {
            return 0.0;
        }
        let window_start = len.saturating_sub(PRICE_TREND_WINDOW);
        let first = self.price_history[window_start].1;
        let last = self.price_history[len - 1].1;
        if first.abs() < f64::EPSILON {
            return 0.0;
        }
        ((last - first) / first).clamp(-1.0, 1.0)
    }

    /// Per-unit waste when processing this resource. Nothing at this level.
    pub fn waste_products(&self) -> ResourceMap {
        ResourceMap::new()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.commodity.id == other.commodity.id
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.commodity.id.hash(state);
    }
}
