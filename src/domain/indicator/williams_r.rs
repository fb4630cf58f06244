//! Williams %R indicator.
//!
//! %R = ((highest_high(n) - close) / (highest_high(n) - lowest_low(n))) * -100
//!
//! Output lies in [-100, 0]. A zero n-bar range would divide by zero, so that
//! position is undefined rather than NaN.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue};

pub fn calculate_williams_r(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorKind::WilliamsR(period), bars);
    }

    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        if i + 1 < period {
            values.push(IndicatorPoint::undefined(bars[i].timestamp));
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let highest_high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest_low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let range = highest_high - lowest_low;

        if range == 0.0 {
            values.push(IndicatorPoint::undefined(bars[i].timestamp));
            continue;
        }

        let r = ((highest_high - bars[i].close) / range) * -100.0;
        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid: true,
            value: IndicatorValue::Simple(r),
        });
    }

    IndicatorSeries {
        kind: IndicatorKind::WilliamsR(period),
        values,
    }
}
