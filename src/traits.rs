//! Core trait for layered belief recursions.
//!
//! Both filtering directions share one shape: start from a prior belief,
//! then fold a fixed number of steps over it, each step depending only on
//! the current belief and fixed model data. Implement [`BeliefPass`] for a
//! struct capturing the instance (models plus observations) and the provided
//! [`run`](BeliefPass::run) drives it.

use crate::algebra::Distribution;
use crate::error::Result;

/// A belief recursion over a fixed observation sequence.
///
/// Semantics:
/// - There are `num_steps()` steps.
/// - `init_belief()` is the belief before any evidence.
/// - `step(i, belief)` folds the `i`-th piece of evidence into `belief`
///   in place.
pub trait BeliefPass {
    /// Number of steps the pass will take.
    fn num_steps(&self) -> usize;

    /// Belief before the first step.
    fn init_belief(&self) -> Distribution;

    /// Advance `belief` by one step.
    ///
    /// Must only depend on `belief` and fixed instance data.
    fn step(&self, step: usize, belief: &mut Distribution) -> Result<()>;

    /// Run every step and return the final belief.
    fn run(&self) -> Result<Distribution> {
        let mut belief = self.init_belief();
        for step in 0..self.num_steps() {
            self.step(step, &mut belief)?;
        }
        Ok(belief)
    }

    /// Run every step and return a copy of the belief after each one.
    fn run_history(&self) -> Result<Vec<Distribution>> {
        let mut belief = self.init_belief();
        let mut history = Vec::with_capacity(self.num_steps());
        for step in 0..self.num_steps() {
            self.step(step, &mut belief)?;
            history.push(belief.clone());
        }
        Ok(history)
    }
}
