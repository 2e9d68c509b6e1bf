//! Convenience re-exports of the common surface.

pub use crate::errors::{AdError, Result};
pub use crate::loss::{Loss, Mse};
pub use crate::node::{NodeIndex, Op};
pub use crate::optim::{Optimizer, Sgd};
pub use crate::tape::Tape;
pub use crate::train::linear_epoch;
pub use crate::var::Var;
