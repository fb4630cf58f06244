//! Hull Moving Average indicator.
//!
//! HMA(n) = WMA(floor(sqrt(n))) applied to (2*WMA(floor(n/2)) - WMA(n)).
//!
//! The outer smoothing consumes bars of its own, so the first defined value
//! appears after n + floor(sqrt(n)) - 1 bars, not n. Positions before that
//! are invalid; the intermediate series is never computed from a truncated
//! inner window.

use crate::domain::bar::Bar;
use crate::domain::indicator::wma::wma_over;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue};

pub fn calculate_hma(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period < 2 {
        return IndicatorSeries::undefined(IndicatorKind::Hma(period), bars);
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let half = period / 2;
    let smoothing = (period as f64).sqrt().floor() as usize;

    let wma_full = wma_over(&closes, period);
    let wma_half = wma_over(&closes, half);

    let raw: Vec<Option<f64>> = wma_full
        .iter()
        .zip(&wma_half)
        .map(|(full, half)| match (full, half) {
            (Some(full), Some(half)) => Some(2.0 * half - full),
            _ => None,
        })
        .collect();

    let hma = wma_over_defined(&raw, smoothing);

    let values = bars
        .iter()
        .zip(hma)
        .map(|(bar, value)| match value {
            Some(v) => IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Simple(v),
            },
            None => IndicatorPoint::undefined(bar.timestamp),
        })
        .collect();

    IndicatorSeries {
        kind: IndicatorKind::Hma(period),
        values,
    }
}

/// Linear-weight MA over a partially-defined sequence; output is defined only
/// where the entire window is defined.
fn wma_over_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let divisor = (period * (period + 1)) as f64 / 2.0;
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mut sum = 0.0;
        let mut defined = true;
        for (j, value) in window.iter().enumerate() {
            match value {
                Some(v) => sum += (j + 1) as f64 * v,
                None => {
                    defined = false;
                    break;
                }
            }
        }
        if defined {
            out[i] = Some(sum / divisor);
        }
    }
    out
}
