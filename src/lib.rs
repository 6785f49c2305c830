//! Exact inference for discrete Hidden Markov Models.
//!
//! Given a [`TransitionModel`], a [`SensorModel`] and a sequence of observed
//! symbols, this crate computes:
//! 1. the forward belief after a prefix of observations ([`filter()`]),
//! 2. a backward belief from a suffix of observations ([`back_filter`]),
//! 3. the smoothed belief at any time index ([`estimate`]),
//! 4. the most probable hidden state sequence ([`viterbi()`]).
//!
//! Beliefs are plain probability vectors ([`Distribution`]) renormalised after
//! every step, so long sequences never underflow. All passes start from the
//! flat prior over the transition model's states.
//!
//! ## Quick start
//! ```
//! use markov_filter::{filter, viterbi, SensorModel, TransitionModel};
//!
//! let t = TransitionModel::new(vec![vec![0.7, 0.3], vec![0.4, 0.6]]).unwrap();
//! let s = SensorModel::new(vec![vec![0.8, 0.2], vec![0.3, 0.7]]).unwrap();
//!
//! let belief = filter(&[0], &t, &s).unwrap();
//! assert!((belief[0] - 0.7652).abs() < 1e-4);
//!
//! let path = viterbi(&[0, 1, 0], &t, &s).unwrap();
//! assert_eq!(path, vec![0, 0, 0]);
//! ```
//!
//! ## Features
//! - `tracing`: emit spans around each pass and per-step trace events.
//! - `heavy`: enable long-running stress tests.

pub mod algebra;
pub mod error;
pub mod filter;
pub mod model;
pub mod smoother;
pub mod traits;
pub mod utils;
pub mod viterbi;

pub use crate::algebra::{dot, Distribution, Model, SensorModel, TransitionModel};
pub use crate::error::{InferenceError, Result};
pub use crate::filter::{back_filter, filter, filter_all};
pub use crate::model::{Hmm, HmmBuilder};
pub use crate::smoother::{estimate, smooth_all};
pub use crate::traits::BeliefPass;
pub use crate::viterbi::{viterbi, ViterbiTable};
