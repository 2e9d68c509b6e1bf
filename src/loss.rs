//! Loss functions built from tape operations.

use crate::errors::{AdError, Result};
use crate::var::Var;

/// A differentiable loss over a batch of predictions.
///
/// Implementations build the loss value out of tape operations so that a
/// single backward pass from the returned value yields gradients for every
/// parameter the predictions depend on.
pub trait Loss {
    /// Computes the loss of `pred` against `target`.
    ///
    /// Fails with [`AdError::LengthMismatch`] when the slices disagree and
    /// [`AdError::EmptyBatch`] for an empty batch.
    fn compute<'t>(&self, pred: &[Var<'t>], target: &[f64]) -> Result<Var<'t>>;
}

/// Mean squared error: `Σ (predᵢ - targetᵢ)² / n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mse;

impl Loss for Mse {
    fn compute<'t>(&self, pred: &[Var<'t>], target: &[f64]) -> Result<Var<'t>> {
        if pred.len() != target.len() {
            return Err(AdError::LengthMismatch {
                expected: pred.len(),
                actual: target.len(),
            });
        }
        let mut terms = pred.iter().zip(target).map(|(&p, &y)| {
            let diff = p - y;
            diff * diff
        });
        let first = terms.next().ok_or(AdError::EmptyBatch)?;
        let sum = terms.fold(first, |acc, term| acc + term);
        Ok(sum * (1.0 / pred.len() as f64))
    }
}
