//! SMA-crossover decision step.
//!
//! The bundled reference strategy: go long one instrument while the fast SMA
//! sits above the slow SMA, exit through the shared lifecycle rules. Entry
//! conditions that cannot be computed yet (warm-up) read as false, so the
//! strategy stays flat until both averages are defined.

use super::allocation::Allocation;
use super::error::EngineError;
use super::harness::DecisionStep;
use super::indicator::calculate_sma;
use super::lifecycle::{self, ExitRules};
use super::series::HistoryView;
use super::state::StrategyState;

#[derive(Debug, Clone)]
pub struct SmaCrossover {
    pub instrument: String,
    pub fast_period: usize,
    pub slow_period: usize,
    pub target_weight: f64,
    pub exits: ExitRules,
}

impl SmaCrossover {
    pub fn new(instrument: &str, fast_period: usize, slow_period: usize) -> Self {
        SmaCrossover {
            instrument: instrument.to_string(),
            fast_period,
            slow_period,
            target_weight: 1.0,
            exits: ExitRules::default(),
        }
    }

    fn held_allocation(&self, state: &StrategyState) -> Allocation {
        if state.is_entered() {
            Allocation::single(&self.instrument, self.target_weight)
        } else {
            Allocation::flat()
        }
    }
}

impl DecisionStep for SmaCrossover {
    fn decide(
        &self,
        view: &HistoryView<'_>,
        state: &mut StrategyState,
    ) -> Result<Allocation, EngineError> {
        let Some(bars) = view.bars(&self.instrument) else {
            return Ok(Allocation::flat());
        };

        // no bar for this instrument today: keep the current stance untouched
        if !view.has_bar_at(&self.instrument) {
            return Ok(self.held_allocation(state));
        }

        let close = bars[bars.len() - 1].close;

        if state.is_entered() {
            lifecycle::hold(state, close, view.prev_close(&self.instrument));
            if self.exits.check(state, close).is_some() {
                lifecycle::exit(state);
                return Ok(Allocation::flat());
            }
            return Ok(Allocation::single(&self.instrument, self.target_weight));
        }

        let last = bars.len() - 1;
        let fast = calculate_sma(bars, self.fast_period).simple_at(last);
        let slow = calculate_sma(bars, self.slow_period).simple_at(last);

        match (fast, slow) {
            (Some(fast), Some(slow)) if fast > slow => {
                lifecycle::enter(state, close);
                Ok(Allocation::single(&self.instrument, self.target_weight))
            }
            // undefined averages are a neutral signal, not an error
            _ => Ok(Allocation::flat()),
        }
    }
}
