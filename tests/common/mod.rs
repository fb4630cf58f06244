#![allow(dead_code)]

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::HashMap;

use allokit::domain::allocation::Allocation;
pub use allokit::domain::bar::Bar;
use allokit::domain::error::EngineError;
use allokit::domain::series::BarSeries;
use allokit::ports::data_port::BarSource;
use allokit::ports::sink_port::AllocationSink;

pub fn ts(day: u64) -> DateTime<Utc> {
    (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(day))
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn make_bar(instrument: &str, day: u64, close: f64) -> Bar {
    Bar {
        instrument: instrument.to_string(),
        timestamp: ts(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Daily bars with the given closes, starting 2024-01-01.
pub fn generate_bars(instrument: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(instrument, i as u64, close))
        .collect()
}

pub fn series_from_bars(bars: Vec<Bar>) -> BarSeries {
    let mut series = BarSeries::new();
    for bar in bars {
        series.append(bar).unwrap();
    }
    series
}

pub struct MockBarSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl BarSource for MockBarSource {
    fn fetch_bars(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, EngineError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(EngineError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(instrument)
            .map(|bars| {
                bars.iter()
                    .filter(|bar| bar.timestamp >= start && bar.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_instruments(&self) -> Result<Vec<String>, EngineError> {
        let mut instruments: Vec<String> = self.data.keys().cloned().collect();
        instruments.sort();
        Ok(instruments)
    }

    fn data_range(
        &self,
        instrument: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, EngineError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(EngineError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(instrument) {
            Some(bars) if !bars.is_empty() => Ok(Some((
                bars[0].timestamp,
                bars[bars.len() - 1].timestamp,
                bars.len(),
            ))),
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub emitted: Vec<(String, DateTime<Utc>, Allocation)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn for_strategy(&self, strategy_id: &str) -> Vec<&(String, DateTime<Utc>, Allocation)> {
        self.emitted
            .iter()
            .filter(|(id, _, _)| id == strategy_id)
            .collect()
    }
}

impl AllocationSink for RecordingSink {
    fn emit(
        &mut self,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
        allocation: &Allocation,
    ) -> Result<(), EngineError> {
        self.emitted
            .push((strategy_id.to_string(), timestamp, allocation.clone()));
        Ok(())
    }
}
