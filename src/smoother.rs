//! Fixed-point smoothing.
//!
//! The smoothed belief at time `at` multiplies the forward belief over the
//! evidence before `at` with the backward belief over the evidence from `at`
//! on, then renormalises.

use crate::algebra::{Distribution, SensorModel, TransitionModel};
use crate::error::{InferenceError, Result};
use crate::filter::{back_filter, filter};
use crate::utils::check_inputs;

/// Smoothed belief at the one-based time index `at` (`0 <= at <= len`).
///
/// `at == 0` uses the flat prior on the forward side and `at == len` uses it
/// on the backward side.
pub fn estimate(
    at: usize,
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Distribution> {
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("estimate", at, steps = observations.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let len = observations.len();
    if at > len {
        return Err(InferenceError::TimeIndexOutOfRange { at, len });
    }
    check_inputs(observations, transition, sensor)?;

    let flat = Distribution::flat(transition.n_states());
    let forward = if at > 0 {
        filter(&observations[..at], transition, sensor)?
    } else {
        flat.clone()
    };
    let backward = if at < len {
        back_filter(&observations[at..], transition, sensor)?
    } else {
        flat
    };

    let mut d = forward;
    d.elementwise_multiply(backward.as_slice())?;
    d.normalize();

    #[cfg(feature = "tracing")]
    tracing::debug!(%d, "smoothed");
    Ok(d)
}

/// Smoothed beliefs for every time index `0..=len`.
pub fn smooth_all(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Vec<Distribution>> {
    (0..=observations.len())
        .map(|at| estimate(at, observations, transition, sensor))
        .collect()
}
