//! Domain error types.

use chrono::{DateTime, Utc};

/// Top-level error type for allokit.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("insufficient data for {instrument}: have {bars} bars, need {minimum}")]
    InsufficientData {
        instrument: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid bar for {instrument} at {timestamp}: {reason}")]
    InvalidBar {
        instrument: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    #[error("out-of-order bar for {instrument}: {timestamp} does not follow {last}")]
    OutOfOrderBar {
        instrument: String,
        timestamp: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("out-of-order evaluation for {strategy_id}: {timestamp} does not follow {last}")]
    OutOfOrderEvaluation {
        strategy_id: String,
        timestamp: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("invalid allocation: {reason}")]
    InvalidAllocation { reason: String },

    #[error("decision step failed for {strategy_id}: {reason}")]
    Decision {
        strategy_id: String,
        reason: String,
    },

    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io { .. } => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. } => 2,
            EngineError::DataSource { .. } => 3,
            EngineError::InvalidBar { .. }
            | EngineError::OutOfOrderBar { .. }
            | EngineError::OutOfOrderEvaluation { .. } => 4,
            EngineError::NoData { .. } | EngineError::InsufficientData { .. } => 5,
            EngineError::InvalidAllocation { .. } | EngineError::Decision { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
