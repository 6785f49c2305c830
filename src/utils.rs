//! Assorted helpers shared by the inference passes.

use crate::algebra::{SensorModel, TransitionModel};
use crate::error::{InferenceError, Result};

/// Index of the maximum value in `values`.
///
/// Uses a strict `>` comparison, so the first maximal index wins ties and
/// NaN entries never displace the current best. Returns 0 for empty input.
#[inline]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Copy of `observations` in reverse order.
pub fn reversed(observations: &[usize]) -> Vec<usize> {
    observations.iter().rev().copied().collect()
}

/// Check that `transition` and `sensor` describe the same state space and
/// that every observation has a sensor column.
pub fn check_inputs(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<()> {
    if sensor.n_states() != transition.n_states() {
        return Err(InferenceError::DimensionMismatch {
            expected: transition.n_states(),
            actual: sensor.n_states(),
        });
    }
    let symbols = sensor.n_symbols();
    match observations.iter().position(|&o| o >= symbols) {
        Some(step) => Err(InferenceError::ObservationOutOfRange {
            step,
            observation: observations[step],
            symbols,
        }),
        None => Ok(()),
    }
}
