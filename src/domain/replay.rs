//! Replay scheduler: drives bar-by-bar evaluation over a shared series.
//!
//! Strategies are registered with an id, an evaluation interval, and a boxed
//! decision step. The scheduler walks the unified timeline, builds the
//! visible-history view for each timestamp, and fans the normalized
//! allocations out to the sink. Failures stay local to one strategy and one
//! bar; only sink I/O aborts a run.

use chrono::{DateTime, Utc};

use super::calendar::{is_period_boundary, Interval};
use super::error::EngineError;
use super::harness::{DecisionStep, Harness};
use super::series::BarSeries;
use super::state::StrategyState;
use crate::ports::sink_port::AllocationSink;

struct Registration {
    id: String,
    interval: Interval,
    step: Box<dyn DecisionStep>,
    last_tick: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct ReplayScheduler {
    harness: Harness,
    strategies: Vec<Registration>,
}

impl ReplayScheduler {
    pub fn new() -> Self {
        ReplayScheduler::default()
    }

    pub fn register(&mut self, id: &str, interval: Interval, step: Box<dyn DecisionStep>) {
        self.strategies.push(Registration {
            id: id.to_string(),
            interval,
            step,
            last_tick: None,
        });
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Committed state for a strategy, once it has evaluated.
    pub fn state(&self, strategy_id: &str) -> Option<&StrategyState> {
        self.harness.state(strategy_id)
    }

    /// Replay the whole series in timestamp order.
    pub fn run(
        &mut self,
        series: &BarSeries,
        sink: &mut dyn AllocationSink,
    ) -> Result<(), EngineError> {
        for timestamp in series.timeline() {
            self.process(series, timestamp, sink)?;
        }
        Ok(())
    }

    /// Evaluate every due strategy against one timeline timestamp.
    ///
    /// A strategy is due on its first timestamp ever and whenever the
    /// timestamp opens a new bucket of its interval. Instruments without a
    /// bar at this timestamp are simply stale in the view; the decision step
    /// sees them as insufficient data.
    pub fn process(
        &mut self,
        series: &BarSeries,
        timestamp: DateTime<Utc>,
        sink: &mut dyn AllocationSink,
    ) -> Result<(), EngineError> {
        let view = series.view_at(timestamp);

        for registration in &mut self.strategies {
            let due = match registration.last_tick {
                None => true,
                Some(prev) => is_period_boundary(prev, timestamp, registration.interval),
            };
            if !due {
                continue;
            }
            registration.last_tick = Some(timestamp);

            match self
                .harness
                .evaluate(&registration.id, registration.step.as_ref(), &view)
            {
                Ok(allocation) => sink.emit(&registration.id, timestamp, &allocation)?,
                Err(err) => {
                    // sequencing violation for this strategy only; others continue
                    eprintln!("warning: skipping {} at {}: {}", registration.id, timestamp, err);
                }
            }
        }
        Ok(())
    }
}
