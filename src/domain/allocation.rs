//! Target allocations and weight normalization.
//!
//! An allocation maps instruments to portfolio weights in [0, 1]; whatever
//! the weights leave of 1.0 is uninvested cash. Absence from the map and a
//! zero weight mean the same thing, so normalization drops zero entries.

use std::collections::BTreeMap;

use super::error::EngineError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
    weights: BTreeMap<String, f64>,
}

impl Allocation {
    /// The all-cash allocation.
    pub fn flat() -> Self {
        Allocation::default()
    }

    pub fn single(instrument: &str, weight: f64) -> Self {
        let mut allocation = Allocation::default();
        allocation.set(instrument, weight);
        allocation
    }

    pub fn set(&mut self, instrument: &str, weight: f64) {
        self.weights.insert(instrument.to_string(), weight);
    }

    /// Weight for an instrument; absence reads as 0.
    pub fn weight(&self, instrument: &str) -> f64 {
        self.weights.get(instrument).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn is_flat(&self) -> bool {
        self.weights.values().all(|w| *w == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Allocation {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Validate and rescale a proposed allocation.
///
/// Negative or non-finite weights are a contract violation by the proposer
/// and fail outright. Weights above 1 are clamped; if the clamped total
/// exceeds 1 every weight is scaled down proportionally so the total is
/// exactly 1; a zero total is the all-cash allocation. Already-valid input
/// passes through unchanged, so the operation is idempotent.
pub fn normalize(raw: &Allocation) -> Result<Allocation, EngineError> {
    for (instrument, weight) in raw.iter() {
        if !weight.is_finite() {
            return Err(EngineError::InvalidAllocation {
                reason: format!("non-finite weight {weight} for {instrument}"),
            });
        }
        if weight < 0.0 {
            return Err(EngineError::InvalidAllocation {
                reason: format!("negative weight {weight} for {instrument}"),
            });
        }
    }

    let clamped: Vec<(&str, f64)> = raw
        .iter()
        .map(|(instrument, weight)| (instrument, weight.min(1.0)))
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

    let total: f64 = clamped.iter().map(|(_, w)| w).sum();
    if total == 0.0 {
        return Ok(Allocation::flat());
    }

    // the epsilon keeps rescaling idempotent: a rescaled sum can land one
    // ulp above 1.0 and must not trigger a second rescale
    if total <= 1.0 + 1e-9 {
        return Ok(clamped
            .into_iter()
            .map(|(instrument, weight)| (instrument.to_string(), weight))
            .collect());
    }

    Ok(clamped
        .into_iter()
        .map(|(instrument, weight)| (instrument.to_string(), weight / total))
        .collect())
}
