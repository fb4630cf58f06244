//! Configuration validation.
//!
//! All parameters are checked up front; a bad window length or a malformed
//! date is fatal at startup, never a per-bar surprise.

use chrono::NaiveDate;

use super::calendar::Interval;
use super::error::EngineError;
use super::indicator::IndicatorKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_replay_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_data_dir(config)?;
    validate_interval(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_instrument(config)?;
    validate_periods(config)?;
    validate_target_weight(config)?;
    validate_exit_rules(config)?;
    Ok(())
}

fn invalid(key: &str, reason: &str) -> EngineError {
    EngineError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), EngineError> {
    match config.get_string("replay", "data_dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(()),
        _ => Err(EngineError::ConfigMissing {
            section: "replay".to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let raw = config
        .get_string("replay", "interval")
        .unwrap_or_else(|| "1day".to_string());
    Interval::parse(&raw).ok_or(EngineError::ConfigInvalid {
        section: "replay".to_string(),
        key: "interval".to_string(),
        reason: format!("unknown interval {raw:?}"),
    })?;
    Ok(())
}

fn parse_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, EngineError> {
    match config.get_string("replay", key) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| EngineError::ConfigInvalid {
                section: "replay".to_string(),
                key: key.to_string(),
                reason: format!("expected YYYY-MM-DD, got {raw:?} ({e})"),
            }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(EngineError::ConfigInvalid {
                section: "replay".to_string(),
                key: "start_date".to_string(),
                reason: "start_date is after end_date".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_instrument(config: &dyn ConfigPort) -> Result<(), EngineError> {
    match config.get_string("strategy", "instrument") {
        Some(instrument) if !instrument.trim().is_empty() => Ok(()),
        _ => Err(EngineError::ConfigMissing {
            section: "strategy".to_string(),
            key: "instrument".to_string(),
        }),
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let fast = config.get_int("strategy", "fast_period", 10);
    let slow = config.get_int("strategy", "slow_period", 50);

    if fast <= 0 {
        return Err(invalid("fast_period", "must be positive"));
    }
    if slow <= 0 {
        return Err(invalid("slow_period", "must be positive"));
    }
    if fast >= slow {
        return Err(invalid("fast_period", "must be shorter than slow_period"));
    }

    // the same window checks every indicator gets at startup
    IndicatorKind::Sma(fast as usize).validate()?;
    IndicatorKind::Sma(slow as usize).validate()?;
    Ok(())
}

fn validate_target_weight(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let weight = config.get_double("strategy", "target_weight", 1.0);
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(invalid("target_weight", "must be within [0, 1]"));
    }
    Ok(())
}

fn validate_exit_rules(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let stop = config.get_double("strategy", "stop_loss_pct", 0.0);
    if !stop.is_finite() || !(0.0..1.0).contains(&stop) {
        return Err(invalid("stop_loss_pct", "must be within [0, 1)"));
    }
    if config.get_int("strategy", "max_hold_days", 0) < 0 {
        return Err(invalid("max_hold_days", "must be non-negative"));
    }
    if config.get_int("strategy", "bullish_streak_limit", 0) < 0 {
        return Err(invalid("bullish_streak_limit", "must be non-negative"));
    }
    Ok(())
}
