//! Reverse-mode automatic differentiation with gradient descent optimizers.
//!
//! This crate provides a tape-based implementation for recording scalar
//! operations and propagating adjoints to compute gradients, plus the
//! optimizers and loss functions needed to drive gradient descent with them.
//!
//! # Example
//! ```
//! use tapegrad::prelude::*;
//!
//! let tape = Tape::new();
//! let x = tape.var(2.0);
//! let y = (x * x + 1.0).ln()?;
//! y.backward()?;
//! assert!((x.grad()? - 0.8).abs() < 1e-12); // 2x / (x² + 1)
//! # tapegrad::Result::Ok(())
//! ```

pub mod errors;
pub mod loss;
pub mod node;
pub mod optim;
pub mod prelude;
pub mod tape;
pub mod train;
pub mod var;
mod ops;
mod overloads;

pub use errors::{AdError, Result};
pub use tape::Tape;
pub use var::Var;
