//! A one-epoch training driver for a bias-free linear model.

use crate::errors::{AdError, Result};
use crate::loss::Loss;
use crate::optim::Optimizer;
use crate::tape::Tape;
use crate::var::Var;

/// Runs one full gradient descent epoch of `ŷᵢ = Σⱼ wⱼ·xᵢⱼ` over a batch.
///
/// Records the forward pass on `tape`, evaluates `loss`, backpropagates,
/// hands the weight gradients to `optimizer` and clears the tape so the next
/// epoch starts from an empty arena. Returns the epoch loss.
///
/// Every row of `inputs` must have one feature per weight.
pub fn linear_epoch(
    tape: &Tape,
    weights: &mut [f64],
    inputs: &[Vec<f64>],
    targets: &[f64],
    loss: &dyn Loss,
    optimizer: &mut dyn Optimizer,
) -> Result<f64> {
    if inputs.len() != targets.len() {
        return Err(AdError::LengthMismatch {
            expected: inputs.len(),
            actual: targets.len(),
        });
    }
    tape.clear();

    let w: Vec<Var<'_>> = weights.iter().map(|&v| tape.var(v)).collect();
    let mut preds = Vec::with_capacity(inputs.len());
    for row in inputs {
        if row.len() != w.len() {
            return Err(AdError::LengthMismatch {
                expected: w.len(),
                actual: row.len(),
            });
        }
        let mut pred = tape.var(0.0);
        for (&wj, &xj) in w.iter().zip(row) {
            pred += wj * xj;
        }
        preds.push(pred);
    }

    let epoch_loss = loss.compute(&preds, targets)?;
    epoch_loss.backward()?;

    let grads: Vec<f64> = w.iter().map(Var::grad).collect::<Result<_>>()?;
    optimizer.step(weights, &grads)?;

    let out = epoch_loss.value();
    log::debug!("epoch loss {out}, {} tape nodes", tape.len());
    tape.clear();
    Ok(out)
}
