//! Market-data access port trait.
//!
//! The bar history is produced by an external collaborator; the engine only
//! consumes it through this trait.

use chrono::{DateTime, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::EngineError;

pub trait BarSource {
    /// Bars for one instrument within [start, end], in timestamp order.
    fn fetch_bars(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, EngineError>;

    fn list_instruments(&self) -> Result<Vec<String>, EngineError>;

    /// (first, last, bar count) for an instrument, `None` when unknown.
    fn data_range(
        &self,
        instrument: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, EngineError>;
}
