//! Realized volatility over log returns.
//!
//! vol[i] = sqrt(sum(r^2) / (n - 1)) where r are the n log returns of closes
//! ending at bar i. Used for volatility-regime switches: the current reading
//! is compared against a forward-shifted copy of the series and against
//! percentile thresholds computed over the indicator's own history.
//!
//! Warmup: n log returns need n+1 closes, so the first n bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue};

pub fn calculate_realized_vol(bars: &[Bar], window: usize) -> IndicatorSeries {
    calculate_realized_vol_shifted(bars, window, 0)
}

/// Realized volatility where the value at bar i is the volatility of the
/// window ending `shift` bars earlier. `shift = 0` is the current reading;
/// comparing it against a shifted copy implements the regime check used by
/// the volatility-switch allocation rules.
pub fn calculate_realized_vol_shifted(
    bars: &[Bar],
    window: usize,
    shift: usize,
) -> IndicatorSeries {
    let kind = IndicatorKind::RealizedVol(window);
    if window < 2 {
        return IndicatorSeries::undefined(kind, bars);
    }

    // log_returns[i] is the return from bar i-1 to bar i; index 0 unused.
    let mut squared_returns = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let r = (bars[i].close / bars[i - 1].close).ln();
        squared_returns[i] = r * r;
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        // the window of returns ends `shift` bars back and spans `window`
        // returns, the earliest of which needs a predecessor close
        if i < window + shift {
            values.push(IndicatorPoint::undefined(bar.timestamp));
            continue;
        }

        let end = i - shift;
        let sum: f64 = squared_returns[end + 1 - window..=end].iter().sum();
        let vol = (sum / (window - 1) as f64).sqrt();

        if vol.is_finite() {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Simple(vol),
            });
        } else {
            values.push(IndicatorPoint::undefined(bar.timestamp));
        }
    }

    IndicatorSeries { kind, values }
}

/// Linear-interpolated percentile (numpy convention) over a sample, used to
/// derive regime thresholds from an indicator's own defined output.
/// `None` on an empty sample or a percentile outside [0, 100].
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&pct) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
