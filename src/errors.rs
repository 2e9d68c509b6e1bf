//! Error types for the automatic differentiation crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Error variants for tape, operator and optimizer failures.
pub enum AdError {
    #[error("invalid parent index {parent} for tape of length {len}")]
    /// A recorded node referenced a parent that is not on the tape yet.
    ///
    /// This indicates malformed tape construction, not a recoverable
    /// condition.
    InvalidParent {
        /// The offending parent index.
        parent: usize,
        /// The tape length at the time of recording.
        len: usize,
    },
    #[error("{op} is undefined for operand {value}")]
    /// An operator was applied outside its real-valued domain.
    Domain {
        /// Name of the rejected operator.
        op: &'static str,
        /// The operand that fell outside the domain.
        value: f64,
    },
    #[error("non-finite gradient {value} for parameter {index}")]
    /// A NaN or infinite gradient reached an optimizer step.
    InvalidGradient {
        /// Slot of the affected parameter.
        index: usize,
        /// The offending gradient value.
        value: f64,
    },
    #[error("node {index} is not on the tape (length {len})")]
    /// A handle referenced a node past the end of the tape, typically after
    /// `clear` invalidated it.
    NodeNotOnTape {
        /// The stale node index.
        index: usize,
        /// The current tape length.
        len: usize,
    },
    #[error("length mismatch: expected {expected}, got {actual}")]
    /// Two paired slices (predictions/targets, params/grads) disagree in length.
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        actual: usize,
    },
    #[error("empty batch")]
    /// A loss was evaluated over zero samples.
    EmptyBatch,
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, AdError>;
