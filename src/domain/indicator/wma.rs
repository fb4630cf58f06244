//! Weighted Moving Average indicator.
//!
//! O(n) sliding window implementation.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue};

pub fn calculate_wma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let wma = wma_over(&closes, period);

    let values = bars
        .iter()
        .zip(wma)
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
        kind: IndicatorKind::Wma(period),
        values,
    }
}

/// Linear-weight moving average over a raw value sequence; `None` during
/// warm-up. Shared with the Hull MA composition.
pub(crate) fn wma_over(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        if i < period {
            let weight = (i + 1) as f64;
            weighted_sum += weight * value;
            window_sum += value;
        } else {
            weighted_sum += period as f64 * value - window_sum;
            window_sum += value - values[i - period];
        }

        if i + 1 >= period {
            out.push(Some(weighted_sum / divisor));
        } else {
            out.push(None);
        }
    }

    out
}
