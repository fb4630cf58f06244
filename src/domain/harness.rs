//! Strategy evaluation harness: load state, run the decision step, commit.
//!
//! The harness treats a strategy as an opaque decision function. State
//! mutation is atomic per evaluation: the decision step works on a scratch
//! clone, and only a successful evaluation commits it. A failing decision
//! step costs the strategy that one bar, nothing else.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::allocation::{normalize, Allocation};
use super::error::EngineError;
use super::series::HistoryView;
use super::state::{StateStore, StrategyState};

/// One bar's decision: map the visible history and the strategy's own state
/// to a proposed allocation. Implementations hold parameters only; all
/// run-to-run memory belongs in `StrategyState`.
pub trait DecisionStep {
    fn decide(
        &self,
        view: &HistoryView<'_>,
        state: &mut StrategyState,
    ) -> Result<Allocation, EngineError>;
}

#[derive(Default)]
pub struct Harness {
    store: StateStore,
    last_evaluated: HashMap<String, DateTime<Utc>>,
}

impl Harness {
    pub fn new() -> Self {
        Harness::default()
    }

    /// Committed state, if the strategy has evaluated at least once.
    pub fn state(&self, strategy_id: &str) -> Option<&StrategyState> {
        self.store.get(strategy_id)
    }

    /// Evaluate one strategy against the view's timestamp.
    ///
    /// Bars must arrive in strictly increasing timestamp order per strategy;
    /// a stale or repeated timestamp is rejected without touching state.
    /// A decision-step error or an unusable proposed allocation yields the
    /// flat allocation for this bar — per-bar failures never escalate.
    pub fn evaluate(
        &mut self,
        strategy_id: &str,
        step: &dyn DecisionStep,
        view: &HistoryView<'_>,
    ) -> Result<Allocation, EngineError> {
        let timestamp = view.timestamp();
        if let Some(&last) = self.last_evaluated.get(strategy_id) {
            if timestamp <= last {
                return Err(EngineError::OutOfOrderEvaluation {
                    strategy_id: strategy_id.to_string(),
                    timestamp,
                    last,
                });
            }
        }

        let mut scratch = self.store.load(strategy_id);
        let decision = step.decide(view, &mut scratch);
        self.last_evaluated
            .insert(strategy_id.to_string(), timestamp);

        let proposed = match decision {
            Ok(proposed) => proposed,
            Err(err) => {
                // scratch is dropped; re-committing the loaded value rolls the
                // record back (and materializes the zeroed one on a first call)
                eprintln!("warning: {strategy_id}: decision failed at {timestamp} ({err}); bar skipped");
                self.store.commit(strategy_id, self.store.load(strategy_id));
                return Ok(Allocation::flat());
            }
        };

        match normalize(&proposed) {
            Ok(allocation) => {
                self.store.commit(strategy_id, scratch);
                Ok(allocation)
            }
            Err(err) => {
                // the decision itself completed, so its state survives; only
                // the unusable proposal is replaced by all-cash
                eprintln!("warning: {strategy_id}: {err}; going flat at {timestamp}");
                self.store.commit(strategy_id, scratch);
                Ok(Allocation::flat())
            }
        }
    }
}
