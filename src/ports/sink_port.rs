//! Allocation output port trait.
//!
//! One normalized allocation per (strategy, interval tick) flows out here;
//! the execution or reporting collaborator behind the sink owns everything
//! downstream.

use chrono::{DateTime, Utc};

use crate::domain::allocation::Allocation;
use crate::domain::error::EngineError;

pub trait AllocationSink {
    fn emit(
        &mut self,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
        allocation: &Allocation,
    ) -> Result<(), EngineError>;
}
