//! Viterbi decoding with per-step normalisation.
//!
//! The decoder fills a `[step][state]` table of best-path scores together with
//! backpointers, then traces the best path back from the highest-scoring
//! final state.
//!
//! Each row of scores is renormalised once it is complete. This rescales all
//! states of a step by the same factor, so the ranking used for the traceback
//! is unchanged while magnitudes stay bounded on long sequences.

use crate::algebra::{Distribution, SensorModel, TransitionModel};
use crate::error::Result;
use crate::utils::check_inputs;
use std::fmt;

/// Dynamic-programming table built by the decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct ViterbiTable {
    /// Normalised best-path score of each state, `[step][state]`.
    pub values: Vec<Distribution>,
    /// Predecessor on the best path into each state, `[step][state]`.
    /// Row 0 is all zeros.
    pub backpointer: Vec<Vec<usize>>,
}

impl ViterbiTable {
    /// Fill the table for `observations`.
    ///
    /// Predecessor selection uses strict `>` against a running maximum that
    /// starts at `0.0`: the lowest index wins ties, and state 0 is recorded
    /// when no candidate is positive.
    pub fn build(
        observations: &[usize],
        transition: &TransitionModel,
        sensor: &SensorModel,
    ) -> Result<Self> {
        check_inputs(observations, transition, sensor)?;

        let steps = observations.len();
        let states = transition.n_states();
        let initial = Distribution::flat(states);

        let mut values: Vec<Distribution> = Vec::with_capacity(steps);
        let mut backpointer = vec![vec![0usize; states]; steps];

        for (step, &obs) in observations.iter().enumerate() {
            let mut row = Distribution::new(vec![0.0; states]);
            for state in 0..states {
                let score = match values.last() {
                    None => initial[state],
                    Some(prev_row) => {
                        let mut best = 0.0;
                        for prev in 0..states {
                            let cand = prev_row[prev] * transition[prev][state];
                            if cand > best {
                                best = cand;
                                backpointer[step][state] = prev;
                            }
                        }
                        best
                    }
                };
                row[state] = score * sensor[state][obs];
            }
            row.normalize();

            #[cfg(feature = "tracing")]
            tracing::trace!(
                step,
                observation = obs,
                values = %row,
                backpointer = ?backpointer[step],
                "viterbi step"
            );
            values.push(row);
        }

        Ok(Self {
            values,
            backpointer,
        })
    }

    #[inline]
    pub fn num_steps(&self) -> usize {
        self.values.len()
    }

    /// Trace the most probable state sequence back from the final row.
    ///
    /// Returns an empty path for an empty table.
    pub fn best_path(&self) -> Vec<usize> {
        let Some(last) = self.values.last() else {
            return Vec::new();
        };
        let steps = self.values.len();
        let mut path = vec![0usize; steps];
        path[steps - 1] = last.argmax();
        for at in (1..steps).rev() {
            path[at - 1] = self.backpointer[at][path[at]];
        }
        path
    }
}

/// Two grids, states down and steps across: scores to three decimals, then
/// backpointers.
impl fmt::Display for ViterbiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states = self.values.first().map_or(0, Distribution::len);
        for state in 0..states {
            for row in &self.values {
                write!(f, "{:.3}\t", row[state])?;
            }
            writeln!(f)?;
        }
        for state in 0..states {
            for row in &self.backpointer {
                write!(f, "{}\t", row[state])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Most probable state sequence for `observations`, one index per step.
pub fn viterbi(
    observations: &[usize],
    transition: &TransitionModel,
    sensor: &SensorModel,
) -> Result<Vec<usize>> {
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("viterbi", steps = observations.len());
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let table = ViterbiTable::build(observations, transition, sensor)?;
    Ok(table.best_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;

    fn models() -> (TransitionModel, SensorModel) {
        (
            TransitionModel::new(vec![vec![0.7, 0.3], vec![0.4, 0.6]]).unwrap(),
            SensorModel::new(vec![vec![0.8, 0.2], vec![0.3, 0.7]]).unwrap(),
        )
    }

    #[test]
    fn first_row_is_prior_times_emission() {
        let (t, s) = models();
        let table = ViterbiTable::build(&[0], &t, &s).unwrap();
        assert!((table.values[0][0] - 0.4 / 0.55).abs() < 1e-12);
        assert!((table.values[0][1] - 0.15 / 0.55).abs() < 1e-12);
        assert_eq!(table.best_path(), vec![0]);
    }

    #[test]
    fn rows_are_normalised() {
        let (t, s) = models();
        let table = ViterbiTable::build(&[0, 1, 0, 1, 1], &t, &s).unwrap();
        for row in &table.values {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn assignment_sequence() {
        let (t, s) = models();
        let table = ViterbiTable::build(&[0, 1, 0], &t, &s).unwrap();
        assert!((table.values[1][0] - 0.4).abs() < 1e-9);
        assert!((table.values[1][1] - 0.6).abs() < 1e-9);
        assert_eq!(table.backpointer[1], vec![0, 0]);
        assert_eq!(table.backpointer[2], vec![0, 1]);
        assert_eq!(table.best_path(), vec![0, 0, 0]);
    }

    #[test]
    fn ties_pick_lowest_predecessor() {
        let t = TransitionModel::new(vec![vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
        let s = SensorModel::new(vec![vec![0.4, 0.5, 0.1], vec![0.4, 0.1, 0.5]]).unwrap();
        let table = ViterbiTable::build(&[0, 2], &t, &s).unwrap();
        assert_eq!(table.backpointer[1], vec![0, 0]);
        assert_eq!(table.best_path(), vec![0, 1]);
    }

    #[test]
    fn empty_observations_give_empty_path() {
        let (t, s) = models();
        let table = ViterbiTable::build(&[], &t, &s).unwrap();
        assert_eq!(table.num_steps(), 0);
        assert!(viterbi(&[], &t, &s).unwrap().is_empty());
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let (t, s) = models();
        assert!(matches!(
            viterbi(&[0, 2], &t, &s),
            Err(InferenceError::ObservationOutOfRange { step: 1, .. })
        ));
    }

    #[test]
    fn display_dumps_both_grids() {
        let (t, s) = models();
        let table = ViterbiTable::build(&[0, 1], &t, &s).unwrap();
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("0.727\t0.400\t"));
        assert_eq!(lines[2], "0\t0\t");
    }
}
