//! Per-strategy persistent state.
//!
//! Each strategy instance owns one `StrategyState` record that survives
//! across bar evaluations: holding counters, the recorded entry price, the
//! volatility regime, and a cooldown for rebalancing rules. The `StateStore`
//! keeps the committed copy; the harness hands the decision step a scratch
//! clone and commits it only when the evaluation succeeds.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Regime {
    #[default]
    Neutral,
    RiskOn,
    RiskOff,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyState {
    pub days_held: u32,
    pub entry_price: Option<f64>,
    pub consecutive_bullish_days: u32,
    pub regime: Regime,
    pub rebalance_cooldown: u32,
    /// Scratch fields for strategy-specific scalars that have no dedicated
    /// slot (cached prices, custom counters).
    pub extras: BTreeMap<String, f64>,
}

impl StrategyState {
    pub fn is_entered(&self) -> bool {
        self.entry_price.is_some()
    }

    /// Zero everything back to the initial record.
    pub fn reset(&mut self) {
        *self = StrategyState::default();
    }

    /// Count down the rebalance cooldown; true while still cooling.
    pub fn tick_cooldown(&mut self) -> bool {
        if self.rebalance_cooldown > 0 {
            self.rebalance_cooldown -= 1;
            true
        } else {
            false
        }
    }
}

/// Committed state per strategy id. One writer per id: the harness
/// serializes evaluations, so load/commit never race.
#[derive(Debug, Default)]
pub struct StateStore {
    committed: HashMap<String, StrategyState>,
}

impl StateStore {
    pub fn new() -> Self {
        StateStore::default()
    }

    /// The committed record, or a zeroed one on first touch. Returns a clone:
    /// mutations only become visible through `commit`.
    pub fn load(&self, strategy_id: &str) -> StrategyState {
        self.committed.get(strategy_id).cloned().unwrap_or_default()
    }

    pub fn commit(&mut self, strategy_id: &str, state: StrategyState) {
        self.committed.insert(strategy_id.to_string(), state);
    }

    pub fn get(&self, strategy_id: &str) -> Option<&StrategyState> {
        self.committed.get(strategy_id)
    }
}
