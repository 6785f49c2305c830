//! Forward and backward filtering.
//!
//! Both passes start from the flat prior over the transition model's states
//! and renormalise after every observation.
//!
//! - The forward pass predicts with the *transposed* transition matrix, then
//!   weighs by the sensor likelihoods of the observation.
//! - The backward pass walks the observations in reverse, weighs by the
//!   sensor likelihoods first, then predicts with the transition matrix as is.

use crate::algebra::{Distribution, Model, SensorModel, TransitionModel};
use crate::error::Result;
use crate::traits::BeliefPass;
use crate::utils::{check_inputs, reversed};

/// Forward filtering over an observation prefix.
///
/// Observations are range-checked once in [`new`](Self::new); steps index the
/// sensor columns directly.
pub struct ForwardPass<'a> {
    observations: &'a [usize],
    /// Transposed transition matrix used in the predict step.
    predict: Model,
    /// Sensor columns, one per symbol.
    likelihoods: Vec<Distribution>,
    n_states: usize,
}

impl<'a> ForwardPass<'a> {
    pub fn new(
        observations: &'a [usize],
        transition: &TransitionModel,
        sensor: &SensorModel,
    ) -> Result<Self> {
        check_inputs(observations, transition, sensor)?;
        Ok(Self {
            observations,
            predict: transition.transpose()?,
            likelihoods: sensor.columns(),
            n_states: transition.n_states(),
        })
    }
}

impl BeliefPass for ForwardPass<'_> {
    fn num_steps(&self) -> usize {
        self.observations.len()
    }

    fn init_belief(&self) -> Distribution {
        Distribution::flat(self.n_states)
    }

    fn step(&self, step: usize, belief: &mut Distribution) -> Result<()> {
        let e = self.observations[step];
        belief.apply_model(&self.predict)?;
        belief.elementwise_multiply(self.likelihoods[e].as_slice())?;
        belief.normalize();
        #[cfg(feature = "tracing")]
        tracing::trace!(step, observation = e, belief = %belief, "forward step");
        Ok(())
    }
}

/// Backward filtering over an observation suffix.
pub struct BackwardPass<'a> {
    /// Observations, last one first.
    observations: Vec<usize>,
    transition: &'a TransitionModel,
    likelihoods: Vec<Distribution>,
}

impl<'a> BackwardPass<'a> {
    pub fn new(
        observations: &[usize],
        transition: &'a TransitionModel,
        sensor: &SensorModel,
    ) -> Result<Self> {
        check_inputs(observations, transition, sensor)?;
        Ok(Self {
            observations: reversed(observations),
            transition,
            likelihoods: sensor.columns(),
        })
    }
}

impl BeliefPass for BackwardPass<'_> {
    fn num_steps(&self) -> usize {
        self.observations.len()
    }

    fn init_belief(&self) -> Distribution {
        Distribution::flat(self.transition.n_states())
    }

    fn step(&self, step: usize, belief: &mut Distribution) -> Result<()> {
        let e = self.observations[step];
        belief.elementwise_multiply(self.likelihoods[e].as_slice())?;
        belief.apply_model(self.transition)?;
        belief.normalize();
        #[cfg(feature = "tracing")]
        tracing::trace!(step, observation = e, belief = %belief, "backward step");
        Ok(())
    }
}

/// Forward belief after the whole of `observations`.
///
/// An empty sequence returns the flat prior.
pub fn filter(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Distribution> {
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("filter", steps = observations.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    ForwardPass::new(observations, transition, sensor)?.run()
}

/// Forward belief after each prefix `observations[..1]`, `observations[..2]`, ...
pub fn filter_all(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Vec<Distribution>> {
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("filter_all", steps = observations.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    ForwardPass::new(observations, transition, sensor)?.run_history()
}

/// Backward belief from the whole of `observations`, consumed last to first.
///
/// An empty sequence returns the flat prior.
pub fn back_filter(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Distribution> {
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("back_filter", steps = observations.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    BackwardPass::new(observations, transition, sensor)?.run()
}
