//! Reusable FLAT ⇄ ENTERED position lifecycle.
//!
//! Most allocation rules share the same shape: enter on a signal, then hold
//! until a stop-loss, a maximum holding period, or a bullish-streak target
//! forces an exit. This module owns that bookkeeping so decision steps only
//! supply the entry signal.

use super::state::StrategyState;

/// Exit triggers; any subset may be active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExitRules {
    /// Exit when close <= entry_price * (1 - pct).
    pub stop_loss_pct: Option<f64>,
    /// Exit after holding this many bars.
    pub max_hold_days: Option<u32>,
    /// Exit after this many consecutive up-closes.
    pub bullish_streak_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    MaxHold,
    BullishStreak,
}

impl ExitRules {
    /// Check triggers against the current close. `None` while flat or while
    /// no trigger fires. Stop-loss wins over the time- and streak-based
    /// exits when several fire on the same bar.
    pub fn check(&self, state: &StrategyState, close: f64) -> Option<ExitReason> {
        let entry = state.entry_price?;

        if let Some(pct) = self.stop_loss_pct {
            if close <= entry * (1.0 - pct) {
                return Some(ExitReason::StopLoss);
            }
        }
        if let Some(max_days) = self.max_hold_days {
            if state.days_held >= max_days {
                return Some(ExitReason::MaxHold);
            }
        }
        if let Some(limit) = self.bullish_streak_limit {
            if state.consecutive_bullish_days >= limit {
                return Some(ExitReason::BullishStreak);
            }
        }
        None
    }
}

/// FLAT → ENTERED: record the entry price and restart the counters.
pub fn enter(state: &mut StrategyState, price: f64) {
    state.entry_price = Some(price);
    state.days_held = 0;
    state.consecutive_bullish_days = 0;
}

/// ENTERED → ENTERED: one more bar held; the streak extends on an up-close
/// and restarts otherwise.
pub fn hold(state: &mut StrategyState, close: f64, prev_close: Option<f64>) {
    state.days_held += 1;
    match prev_close {
        Some(prev) if close > prev => state.consecutive_bullish_days += 1,
        Some(_) => state.consecutive_bullish_days = 0,
        None => {}
    }
}

/// ENTERED → FLAT: clear the entry price and all counters.
pub fn exit(state: &mut StrategyState) {
    state.entry_price = None;
    state.days_held = 0;
    state.consecutive_bullish_days = 0;
}
