//! CSV file bar-source adapter.
//!
//! One file per instrument named `<INSTRUMENT>.csv` with a header and rows
//! `timestamp,open,high,low,close,volume`. Timestamps are UTC, either
//! `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::bar::Bar;
use crate::domain::error::EngineError;
use crate::ports::data_port::BarSource;

pub struct CsvBarSource {
    base_path: PathBuf,
}

impl CsvBarSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{instrument}.csv"))
    }

    fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, EngineError> {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
            return Ok(datetime.and_utc());
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
            .map_err(|e| EngineError::DataSource {
                reason: format!("invalid timestamp {input:?}: {e}"),
            })
    }

    fn parse_field<T: FromStr>(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<T, EngineError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = record.get(index).ok_or_else(|| EngineError::DataSource {
            reason: format!("missing {name} column"),
        })?;
        raw.parse().map_err(|e| EngineError::DataSource {
            reason: format!("invalid {name} value {raw:?}: {e}"),
        })
    }
}

impl BarSource for CsvBarSource {
    fn fetch_bars(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, EngineError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| EngineError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| EngineError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let raw_timestamp = record.get(0).ok_or_else(|| EngineError::DataSource {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = Self::parse_timestamp(raw_timestamp)?;
            if timestamp < start || timestamp > end {
                continue;
            }

            bars.push(Bar {
                instrument: instrument.to_string(),
                timestamp,
                open: Self::parse_field(&record, 1, "open")?,
                high: Self::parse_field(&record, 2, "high")?,
                low: Self::parse_field(&record, 3, "low")?,
                close: Self::parse_field(&record, 4, "close")?,
                volume: Self::parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|bar| bar.timestamp);
        Ok(bars)
    }

    fn list_instruments(&self) -> Result<Vec<String>, EngineError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| EngineError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut instruments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EngineError::DataSource {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                instruments.push(stem.to_string());
            }
        }

        instruments.sort();
        Ok(instruments)
    }

    fn data_range(
        &self,
        instrument: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, EngineError> {
        if !self.csv_path(instrument).exists() {
            return Ok(None);
        }
        let bars = self.fetch_bars(instrument, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)?;
        if bars.is_empty() {
            return Ok(None);
        }
        Ok(Some((
            bars[0].timestamp,
            bars[bars.len() - 1].timestamp,
            bars.len(),
        )))
    }
}
