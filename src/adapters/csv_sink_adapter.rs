//! CSV allocation-sink adapter.
//!
//! Appends one row per instrument weight:
//! `strategy_id,timestamp,instrument,weight`. An all-cash tick is recorded
//! as a single row with an empty instrument column, so every (strategy,
//! tick) pair appears in the output even when nothing is held.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::Path;

use crate::domain::allocation::Allocation;
use crate::domain::error::EngineError;
use crate::ports::sink_port::AllocationSink;

pub struct CsvSinkAdapter {
    writer: csv::Writer<File>,
}

impl CsvSinkAdapter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let file = File::create(path.as_ref()).map_err(|e| EngineError::Io {
            reason: format!("failed to create {}: {}", path.as_ref().display(), e),
        })?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(["strategy_id", "timestamp", "instrument", "weight"])
            .map_err(|e| EngineError::Io {
                reason: format!("failed to write header: {e}"),
            })?;
        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> Result<(), EngineError> {
        self.writer.flush().map_err(|e| EngineError::Io {
            reason: format!("failed to flush sink: {e}"),
        })
    }
}

impl AllocationSink for CsvSinkAdapter {
    fn emit(
        &mut self,
        strategy_id: &str,
        timestamp: DateTime<Utc>,
        allocation: &Allocation,
    ) -> Result<(), EngineError> {
        let stamp = timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let write_error = |e: csv::Error| EngineError::Io {
            reason: format!("failed to write allocation row: {e}"),
        };

        if allocation.is_flat() {
            self.writer
                .write_record([strategy_id, &stamp, "", "0"])
                .map_err(write_error)?;
            return Ok(());
        }

        for (instrument, weight) in allocation.iter() {
            self.writer
                .write_record([strategy_id, &stamp, instrument, &weight.to_string()])
                .map_err(write_error)?;
        }
        Ok(())
    }
}
