//! Technical indicator engine.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorKind`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every calculate function returns a series the same length as its input
//! window. Positions that cannot be computed (warm-up, zero ranges, non-finite
//! intermediates) carry `valid = false` instead of NaN, so callers never see
//! NaN leak into comparisons.

pub mod sma;
pub mod ema;
pub mod wma;
pub mod hma;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod atr;
pub mod stddev;
pub mod williams_r;
pub mod realized_vol;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use hma::calculate_hma;
pub use macd::calculate_macd;
pub use realized_vol::{calculate_realized_vol, calculate_realized_vol_shifted, percentile};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use williams_r::calculate_williams_r;
pub use wma::calculate_wma;

use chrono::{DateTime, Utc};
use std::fmt;

use super::bar::Bar;
use super::error::EngineError;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub(crate) fn undefined(timestamp: DateTime<Utc>) -> Self {
        IndicatorPoint {
            timestamp,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        }
    }

    /// The scalar reading, or `None` when the point is undefined or the
    /// indicator has a composite shape.
    pub fn simple(&self) -> Option<f64> {
        match self.value {
            IndicatorValue::Simple(v) if self.valid => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Hma(usize),
    Rsi(usize),
    Atr(usize),
    Stddev(usize),
    WilliamsR(usize),
    RealizedVol(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorKind {
    /// Minimum bar count before the first defined output.
    ///
    /// HMA composes three WMAs, so it consumes `floor(sqrt(n)) - 1` bars on
    /// top of the outer window; warming up with only `n` bars would emit
    /// values computed from truncated inner windows.
    pub fn warm_up(&self) -> usize {
        match *self {
            IndicatorKind::Sma(n)
            | IndicatorKind::Ema(n)
            | IndicatorKind::Wma(n)
            | IndicatorKind::Atr(n)
            | IndicatorKind::Stddev(n)
            | IndicatorKind::WilliamsR(n) => n,
            IndicatorKind::Hma(n) => n + (n as f64).sqrt().floor() as usize - 1,
            IndicatorKind::Rsi(n) => n + 1,
            IndicatorKind::RealizedVol(n) => n + 1,
            IndicatorKind::Macd { slow, signal, .. } => slow + signal - 1,
            IndicatorKind::Bollinger { period, .. } => period,
        }
    }

    /// Parameter check, fatal at startup rather than per bar.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |reason: &str| EngineError::ConfigInvalid {
            section: "indicator".to_string(),
            key: self.to_string(),
            reason: reason.to_string(),
        };

        match *self {
            IndicatorKind::Sma(n)
            | IndicatorKind::Ema(n)
            | IndicatorKind::Wma(n)
            | IndicatorKind::Rsi(n)
            | IndicatorKind::Atr(n)
            | IndicatorKind::WilliamsR(n) => {
                if n == 0 {
                    return Err(invalid("window length must be positive"));
                }
            }
            IndicatorKind::Hma(n) => {
                if n < 2 {
                    return Err(invalid("window length must be at least 2"));
                }
            }
            IndicatorKind::Stddev(n) | IndicatorKind::RealizedVol(n) => {
                if n < 2 {
                    return Err(invalid("window length must be at least 2"));
                }
            }
            IndicatorKind::Macd { fast, slow, signal } => {
                if fast == 0 || slow == 0 || signal == 0 {
                    return Err(invalid("all periods must be positive"));
                }
                if fast >= slow {
                    return Err(invalid("fast period must be shorter than slow"));
                }
            }
            IndicatorKind::Bollinger { period, .. } => {
                if period == 0 {
                    return Err(invalid("window length must be positive"));
                }
            }
        }
        Ok(())
    }

    /// Compute this indicator over a visible window of bars.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorSeries {
        match *self {
            IndicatorKind::Sma(n) => calculate_sma(bars, n),
            IndicatorKind::Ema(n) => calculate_ema(bars, n),
            IndicatorKind::Wma(n) => calculate_wma(bars, n),
            IndicatorKind::Hma(n) => calculate_hma(bars, n),
            IndicatorKind::Rsi(n) => calculate_rsi(bars, n),
            IndicatorKind::Atr(n) => calculate_atr(bars, n),
            IndicatorKind::Stddev(n) => calculate_stddev(bars, n),
            IndicatorKind::WilliamsR(n) => calculate_williams_r(bars, n),
            IndicatorKind::RealizedVol(n) => calculate_realized_vol(bars, n),
            IndicatorKind::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
            IndicatorKind::Bollinger {
                period,
                stddev_mult_x100,
            } => calculate_bollinger(bars, period, stddev_mult_x100),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "SMA({})", period),
            IndicatorKind::Ema(period) => write!(f, "EMA({})", period),
            IndicatorKind::Wma(period) => write!(f, "WMA({})", period),
            IndicatorKind::Hma(period) => write!(f, "HMA({})", period),
            IndicatorKind::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorKind::Atr(period) => write!(f, "ATR({})", period),
            IndicatorKind::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorKind::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
            IndicatorKind::RealizedVol(period) => write!(f, "REALIZED_VOL({})", period),
            IndicatorKind::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorKind::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Full-length series with every position undefined.
    pub(crate) fn undefined(kind: IndicatorKind, bars: &[Bar]) -> Self {
        IndicatorSeries {
            kind,
            values: bars
                .iter()
                .map(|bar| IndicatorPoint::undefined(bar.timestamp))
                .collect(),
        }
    }

    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.values.last()
    }

    /// Scalar reading at index `i`, `None` when out of range or undefined.
    pub fn simple_at(&self, i: usize) -> Option<f64> {
        self.values.get(i).and_then(IndicatorPoint::simple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_sma() {
        assert_eq!(IndicatorKind::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn kind_display_macd() {
        let macd = IndicatorKind::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn kind_display_bollinger() {
        let boll = IndicatorKind::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn kind_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let sma20 = IndicatorKind::Sma(20);
        let hma15 = IndicatorKind::Hma(15);

        map.insert(sma20.clone(), "sma20_series".to_string());
        map.insert(hma15.clone(), "hma15_series".to_string());

        assert_eq!(map.get(&sma20), Some(&"sma20_series".to_string()));
        assert_eq!(
            map.get(&IndicatorKind::Hma(15)),
            Some(&"hma15_series".to_string())
        );
    }

    #[test]
    fn warm_up_simple_windows() {
        assert_eq!(IndicatorKind::Sma(20).warm_up(), 20);
        assert_eq!(IndicatorKind::Rsi(14).warm_up(), 15);
        assert_eq!(
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .warm_up(),
            34
        );
    }

    #[test]
    fn warm_up_hma_includes_inner_windows() {
        // 15 + floor(sqrt(15)) - 1 = 15 + 3 - 1
        assert_eq!(IndicatorKind::Hma(15).warm_up(), 17);
        // 16 + 4 - 1
        assert_eq!(IndicatorKind::Hma(16).warm_up(), 19);
    }

    #[test]
    fn validate_rejects_zero_window() {
        assert!(IndicatorKind::Sma(0).validate().is_err());
        assert!(IndicatorKind::Stddev(1).validate().is_err());
        assert!(IndicatorKind::Sma(1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_macd_fast_not_below_slow() {
        let macd = IndicatorKind::Macd {
            fast: 26,
            slow: 26,
            signal: 9,
        };
        assert!(macd.validate().is_err());
        let macd = IndicatorKind::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert!(macd.validate().is_ok());
    }
}
