//! Probability vectors and stochastic matrices.
//!
//! A [`Distribution`] is a vector with one entry per state; a [`Model`] is a
//! rectangular stack of distributions (rows). [`TransitionModel`] and
//! [`SensorModel`] are thin wrappers that pin down the shape each role needs:
//! transitions are square, sensor models may have any number of symbol columns.
//!
//! Operations that combine operands check their lengths and return
//! [`InferenceError::DimensionMismatch`] on disagreement. Normalising a vector
//! that sums to zero yields NaN entries.

use crate::error::{InferenceError, Result};
use crate::utils::argmax;
use std::fmt;
use std::ops::{Deref, Index, IndexMut};

/// Belief vector over discrete states.
///
/// Entries sum to one only right after [`normalize`](Self::normalize);
/// the inference passes freely hold un-normalised values in between.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Distribution(Vec<f64>);

impl Distribution {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Uniform distribution over `n` states (every entry `1/n`).
    pub fn flat(n: usize) -> Self {
        Self(vec![1.0 / n as f64; n])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Index of the largest entry; the first one wins ties.
    pub fn argmax(&self) -> usize {
        argmax(&self.0)
    }

    /// Divide every entry by the sum of all entries, in place.
    ///
    /// A zero sum produces NaN entries rather than an error.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        for v in self.0.iter_mut() {
            *v /= sum;
        }
    }

    /// Multiply entry by entry with `other`, in place.
    pub fn elementwise_multiply(&mut self, other: &[f64]) -> Result<()> {
        if self.len() != other.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        for (v, &o) in self.0.iter_mut().zip(other) {
            *v *= o;
        }
        Ok(())
    }

    /// Replace `self` with the matrix-vector product `m × self`.
    ///
    /// `m` must be square with dimension equal to `self.len()`.
    pub fn apply_model(&mut self, m: &Model) -> Result<()> {
        if m.n_rows() != self.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.len(),
                actual: m.n_rows(),
            });
        }
        let result = m
            .rows()
            .iter()
            .map(|row| dot(row.as_slice(), self.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        self.0 = result;
        Ok(())
    }
}

impl From<Vec<f64>> for Distribution {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for Distribution {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl Index<usize> for Distribution {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Distribution {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.4}")?;
        }
        write!(f, ">")
    }
}

/// Inner product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(InferenceError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Rectangular matrix stored as rows of [`Distribution`].
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    rows: Vec<Distribution>,
}

impl Model {
    /// Build a model from literal rows.
    ///
    /// Rejects empty input and rows of differing length.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_distributions(rows.into_iter().map(Distribution::from).collect())
    }

    pub fn from_distributions(rows: Vec<Distribution>) -> Result<Self> {
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(InferenceError::EmptyModel),
        };
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(InferenceError::RaggedModel {
                row,
                expected: width,
                actual: r.len(),
            });
        }
        Ok(Self { rows })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.rows.first().map_or(0, Distribution::len)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.n_rows() == self.n_cols()
    }

    pub fn rows(&self) -> &[Distribution] {
        &self.rows
    }

    pub fn row(&self, r: usize) -> Option<&Distribution> {
        self.rows.get(r)
    }

    /// Column `c` as a fresh distribution, or `None` past the last column.
    pub fn column(&self, c: usize) -> Option<Distribution> {
        if c >= self.n_cols() {
            return None;
        }
        Some(Distribution::new(self.rows.iter().map(|row| row[c]).collect()))
    }

    /// Every column, in order. Works for rectangular models, where
    /// [`transpose`](Self::transpose) refuses.
    pub fn columns(&self) -> Vec<Distribution> {
        (0..self.n_cols())
            .map(|c| Distribution::new(self.rows.iter().map(|row| row[c]).collect()))
            .collect()
    }

    /// New model with `result[r][c] = self[c][r]`. Square models only.
    pub fn transpose(&self) -> Result<Model> {
        if !self.is_square() {
            return Err(InferenceError::NonSquare {
                rows: self.n_rows(),
                cols: self.n_cols(),
            });
        }
        Ok(Model {
            rows: self.columns(),
        })
    }

    /// Normalise every row in place.
    pub fn normalize_rows(&mut self) {
        for row in self.rows.iter_mut() {
            row.normalize();
        }
    }

    /// Turn a forwards transition matrix into a backwards one: transpose,
    /// then renormalise each row.
    pub fn reversed(&self) -> Result<Model> {
        let mut t = self.transpose()?;
        t.normalize_rows();
        Ok(t)
    }
}

impl Index<usize> for Model {
    type Output = Distribution;

    #[inline]
    fn index(&self, index: usize) -> &Distribution {
        &self.rows[index]
    }
}

/// State-to-state transition probabilities, `[from][to]`. Always square.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionModel(Model);

impl TransitionModel {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::try_from(Model::new(rows)?)
    }

    /// Number of hidden states.
    #[inline]
    pub fn n_states(&self) -> usize {
        self.0.n_rows()
    }

    pub fn model(&self) -> &Model {
        &self.0
    }
}

impl TryFrom<Model> for TransitionModel {
    type Error = InferenceError;

    fn try_from(model: Model) -> Result<Self> {
        if !model.is_square() {
            return Err(InferenceError::NonSquare {
                rows: model.n_rows(),
                cols: model.n_cols(),
            });
        }
        Ok(Self(model))
    }
}

impl Deref for TransitionModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.0
    }
}

/// Emission probabilities, `[state][symbol]`. May be rectangular.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorModel(Model);

impl SensorModel {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        Ok(Self(Model::new(rows)?))
    }

    #[inline]
    pub fn n_states(&self) -> usize {
        self.0.n_rows()
    }

    /// Number of observation symbols.
    #[inline]
    pub fn n_symbols(&self) -> usize {
        self.0.n_cols()
    }

    pub fn model(&self) -> &Model {
        &self.0
    }

    /// Per-state likelihood of seeing `symbol`.
    pub fn likelihoods(&self, symbol: usize) -> Option<Distribution> {
        self.0.column(symbol)
    }
}

impl From<Model> for SensorModel {
    fn from(model: Model) -> Self {
        Self(model)
    }
}

impl Deref for SensorModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.0
    }
}
