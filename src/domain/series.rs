//! Append-only per-instrument bar history and no-look-ahead views.
//!
//! `BarSeries` owns the full history; a `HistoryView` is a read-only,
//! contiguous prefix per instrument, cut at a single timestamp. Views are the
//! only way decision steps see price data, so look-ahead is impossible by
//! construction.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use super::bar::Bar;
use super::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: BTreeMap<String, Vec<Bar>>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bar. Rejects invalid fields and timestamps that do not
    /// strictly increase per instrument; the series is unchanged on error.
    pub fn append(&mut self, bar: Bar) -> Result<(), EngineError> {
        bar.validate().map_err(|reason| EngineError::InvalidBar {
            instrument: bar.instrument.clone(),
            timestamp: bar.timestamp,
            reason,
        })?;

        let history = self.bars.entry(bar.instrument.clone()).or_default();
        if let Some(last) = history.last() {
            if bar.timestamp <= last.timestamp {
                return Err(EngineError::OutOfOrderBar {
                    instrument: bar.instrument.clone(),
                    timestamp: bar.timestamp,
                    last: last.timestamp,
                });
            }
        }
        history.push(bar);
        Ok(())
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }

    pub fn bars(&self, instrument: &str) -> Option<&[Bar]> {
        self.bars.get(instrument).map(Vec::as_slice)
    }

    pub fn bar_count(&self, instrument: &str) -> usize {
        self.bars.get(instrument).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.bars.values().all(Vec::is_empty)
    }

    /// Sorted unique timestamps across all instruments.
    pub fn timeline(&self) -> Vec<DateTime<Utc>> {
        let unique: BTreeSet<DateTime<Utc>> = self
            .bars
            .values()
            .flat_map(|history| history.iter().map(|bar| bar.timestamp))
            .collect();
        unique.into_iter().collect()
    }

    /// The visible history at `timestamp`: for each instrument, the prefix of
    /// bars with `bar.timestamp <= timestamp`. Instruments with no bar yet are
    /// absent from the view entirely.
    pub fn view_at(&self, timestamp: DateTime<Utc>) -> HistoryView<'_> {
        let mut slices = BTreeMap::new();
        for (instrument, history) in &self.bars {
            let visible = history.partition_point(|bar| bar.timestamp <= timestamp);
            if visible > 0 {
                slices.insert(instrument.as_str(), &history[..visible]);
            }
        }
        HistoryView { timestamp, slices }
    }
}

/// Read-only prefix of a `BarSeries`, cut at one timestamp.
#[derive(Debug, Clone)]
pub struct HistoryView<'a> {
    timestamp: DateTime<Utc>,
    slices: BTreeMap<&'a str, &'a [Bar]>,
}

impl<'a> HistoryView<'a> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn instruments(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.slices.keys().copied()
    }

    pub fn bars(&self, instrument: &str) -> Option<&'a [Bar]> {
        self.slices.get(instrument).copied()
    }

    /// Most recent visible bar, which may be older than the view timestamp.
    pub fn latest(&self, instrument: &str) -> Option<&'a Bar> {
        self.bars(instrument).and_then(<[Bar]>::last)
    }

    /// True when the instrument traded exactly at the view timestamp. A false
    /// return means "no bar for this instrument today": callers treat it the
    /// same as insufficient data.
    pub fn has_bar_at(&self, instrument: &str) -> bool {
        self.latest(instrument)
            .is_some_and(|bar| bar.timestamp == self.timestamp)
    }

    /// Close of the bar before the latest one.
    pub fn prev_close(&self, instrument: &str) -> Option<f64> {
        let bars = self.bars(instrument)?;
        if bars.len() < 2 {
            return None;
        }
        Some(bars[bars.len() - 2].close)
    }
}
