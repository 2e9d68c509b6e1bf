//! Gradient descent optimizers.
//!
//! Parameters live outside the tape as plain `f64`s; each training iteration
//! re-records them as leaves, runs a backward pass, and hands the collected
//! gradients to an optimizer. Optimizer state (the momentum velocity buffer)
//! is keyed by parameter slot and persists across steps.

use crate::errors::{AdError, Result};

/// An update rule consuming gradients and mutating parameters in place.
pub trait Optimizer {
    /// Applies one update step to `params` given `grads`.
    ///
    /// A non-finite gradient fails with [`AdError::InvalidGradient`] before
    /// any parameter is touched, so a poisoned backward pass never corrupts
    /// parameter state. Mismatched slice lengths fail with
    /// [`AdError::LengthMismatch`].
    fn step(&mut self, params: &mut [f64], grads: &[f64]) -> Result<()>;
}

/// Stochastic gradient descent, optionally with momentum.
///
/// Vanilla form: `param -= lr * grad`. With momentum:
/// `v = momentum * v + grad; param -= lr * v`. A momentum coefficient of
/// zero reduces to the vanilla update exactly.
#[derive(Clone, Debug)]
pub struct Sgd {
    lr: f64,
    momentum: f64,
    velocity: Vec<f64>,
}

impl Sgd {
    /// Creates a vanilla gradient descent optimizer.
    pub fn new(lr: f64) -> Self {
        Self::with_momentum(lr, 0.0)
    }

    /// Creates a gradient descent optimizer with momentum.
    pub fn with_momentum(lr: f64, momentum: f64) -> Self {
        Self {
            lr,
            momentum,
            velocity: Vec::new(),
        }
    }

    /// Returns the learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.lr
    }

    /// Returns the momentum coefficient.
    pub fn momentum(&self) -> f64 {
        self.momentum
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [f64], grads: &[f64]) -> Result<()> {
        if grads.len() != params.len() {
            return Err(AdError::LengthMismatch {
                expected: params.len(),
                actual: grads.len(),
            });
        }
        // Validate the whole gradient first: the step is all-or-nothing.
        for (index, &value) in grads.iter().enumerate() {
            if !value.is_finite() {
                return Err(AdError::InvalidGradient { index, value });
            }
        }
        if self.velocity.len() != params.len() {
            // A changed parameter count starts a fresh trajectory.
            self.velocity = vec![0.0; params.len()];
        }
        for ((param, &grad), vel) in params.iter_mut().zip(grads).zip(&mut self.velocity) {
            *vel = self.momentum * *vel + grad;
            *param -= self.lr * *vel;
        }
        log::trace!("sgd step over {} parameters (lr {})", params.len(), self.lr);
        Ok(())
    }
}
