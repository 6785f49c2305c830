//! An HMM bundling its transition and sensor models.
//!
//! [`Hmm`] owns both matrices and exposes every inference pass as a method.
//! Use [`HmmBuilder`] to assemble one from literal rows:
//!
//! ```
//! use markov_filter::HmmBuilder;
//!
//! let hmm = HmmBuilder::new()
//!     .with_transition(vec![vec![0.7, 0.3], vec![0.3, 0.7]])
//!     .with_sensor(vec![vec![0.9, 0.1], vec![0.2, 0.8]])
//!     .require_stochastic(1e-9)
//!     .build()
//!     .unwrap();
//! assert_eq!(hmm.n_states(), 2);
//! assert_eq!(hmm.viterbi(&[0, 0, 1, 0, 0]).unwrap().len(), 5);
//! ```

use crate::algebra::{Distribution, Model, SensorModel, TransitionModel};
use crate::error::{InferenceError, Result};
use crate::filter::{back_filter, filter, filter_all};
use crate::smoother::{estimate, smooth_all};
use crate::viterbi::{viterbi, ViterbiTable};

/// Transition and sensor models over the same state space.
#[derive(Clone, Debug, PartialEq)]
pub struct Hmm {
    transition: TransitionModel,
    sensor: SensorModel,
}

impl Hmm {
    /// Pair two models, checking that they agree on the number of states.
    pub fn new(transition: TransitionModel, sensor: SensorModel) -> Result<Self> {
        if sensor.n_states() != transition.n_states() {
            return Err(InferenceError::DimensionMismatch {
                expected: transition.n_states(),
                actual: sensor.n_states(),
            });
        }
        Ok(Self { transition, sensor })
    }

    pub fn builder() -> HmmBuilder {
        HmmBuilder::new()
    }

    pub fn transition(&self) -> &TransitionModel {
        &self.transition
    }

    pub fn sensor(&self) -> &SensorModel {
        &self.sensor
    }

    #[inline]
    pub fn n_states(&self) -> usize {
        self.transition.n_states()
    }

    #[inline]
    pub fn n_symbols(&self) -> usize {
        self.sensor.n_symbols()
    }

    /// Uniform prior over this model's states.
    pub fn flat(&self) -> Distribution {
        Distribution::flat(self.n_states())
    }

    pub fn filter(&self, observations: &[usize]) -> Result<Distribution> {
        filter(observations, &self.transition, &self.sensor)
    }

    pub fn filter_all(&self, observations: &[usize]) -> Result<Vec<Distribution>> {
        filter_all(observations, &self.transition, &self.sensor)
    }

    pub fn back_filter(&self, observations: &[usize]) -> Result<Distribution> {
        back_filter(observations, &self.transition, &self.sensor)
    }

    /// Smoothed belief at one-based time index `at`.
    pub fn estimate(&self, at: usize, observations: &[usize]) -> Result<Distribution> {
        estimate(at, observations, &self.transition, &self.sensor)
    }

    pub fn smooth_all(&self, observations: &[usize]) -> Result<Vec<Distribution>> {
        smooth_all(observations, &self.transition, &self.sensor)
    }

    pub fn viterbi(&self, observations: &[usize]) -> Result<Vec<usize>> {
        viterbi(observations, &self.transition, &self.sensor)
    }

    pub fn viterbi_table(&self, observations: &[usize]) -> Result<ViterbiTable> {
        ViterbiTable::build(observations, &self.transition, &self.sensor)
    }
}

/// Builder for [`Hmm`].
///
/// Row-stochasticity is not checked unless
/// [`require_stochastic`](Self::require_stochastic) is set.
#[derive(Clone, Debug, Default)]
pub struct HmmBuilder {
    transition: Option<Vec<Vec<f64>>>,
    sensor: Option<Vec<Vec<f64>>>,
    tolerance: Option<f64>,
}

impl HmmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition(mut self, rows: Vec<Vec<f64>>) -> Self {
        self.transition = Some(rows);
        self
    }

    pub fn with_sensor(mut self, rows: Vec<Vec<f64>>) -> Self {
        self.sensor = Some(rows);
        self
    }

    /// Require every row of both models to sum to one within `tolerance`.
    pub fn require_stochastic(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<Hmm> {
        let transition = self
            .transition
            .ok_or(InferenceError::MissingModel("transition"))?;
        let sensor = self.sensor.ok_or(InferenceError::MissingModel("sensor"))?;

        let transition = TransitionModel::new(transition)?;
        let sensor = SensorModel::new(sensor)?;
        if let Some(tol) = self.tolerance {
            check_stochastic("transition", &transition, tol)?;
            check_stochastic("sensor", &sensor, tol)?;
        }
        Hmm::new(transition, sensor)
    }
}

fn check_stochastic(name: &'static str, model: &Model, tolerance: f64) -> Result<()> {
    for (row, r) in model.rows().iter().enumerate() {
        let sum = r.sum();
        if sum.is_nan() || (sum - 1.0).abs() > tolerance {
            return Err(InferenceError::NotStochastic {
                model: name,
                row,
                sum,
            });
        }
    }
    Ok(())
}
