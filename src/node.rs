//! Tape node definitions for the reverse-mode tape.

use std::fmt;

/// Index of a node on the tape.
///
/// Indices are assigned in strict creation order, so a node's parents always
/// carry smaller indices than the node itself. This is the invariant the
/// reverse linear scan in [`Tape::backward`](crate::tape::Tape::backward)
/// relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    #[inline]
    /// Returns the raw position of this node on the tape.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Operation tag for a recorded node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// An input value with no parents.
    Leaf,
    /// Binary addition.
    Add,
    /// Binary subtraction.
    Sub,
    /// Binary multiplication.
    Mul,
    /// Binary division.
    Div,
    /// Power.
    Pow,
    /// Binary maximum.
    Max,
    /// Binary minimum.
    Min,
    /// Unary negation.
    Neg,
    /// Unary exponential.
    Exp,
    /// Unary natural logarithm.
    Log,
    /// Unary square root.
    Sqrt,
    /// Unary sine.
    Sin,
    /// Unary cosine.
    Cos,
    /// Unary hyperbolic tangent.
    Tanh,
    /// Unary absolute value.
    Abs,
}

/// A node recorded on the tape, with parent links and adjoint value.
///
/// Each parent link pairs the parent's index with the local derivative of
/// this node's value with respect to that parent, evaluated at the forward
/// values cached when the node was recorded.
#[derive(Clone, Debug)]
pub struct Node {
    /// The operation that produced this node.
    pub op: Op,
    /// Up to two parent links `(parent index, local derivative)`.
    pub parents: [Option<(NodeIndex, f64)>; 2],
    /// The cached forward value.
    pub val: f64,
    /// The accumulated adjoint for this node.
    pub adj: f64,
}

impl Node {
    #[inline]
    /// Constructs a leaf node holding `val` with zero adjoint.
    pub fn leaf(val: f64) -> Self {
        Self {
            op: Op::Leaf,
            parents: [None, None],
            val,
            adj: 0.0,
        }
    }

    #[inline]
    /// Constructs a node with a single parent link.
    pub fn unary(op: Op, parent: NodeIndex, deriv: f64, val: f64) -> Self {
        Self {
            op,
            parents: [Some((parent, deriv)), None],
            val,
            adj: 0.0,
        }
    }

    #[inline]
    /// Constructs a node with two parent links.
    pub fn binary(op: Op, l: (NodeIndex, f64), r: (NodeIndex, f64), val: f64) -> Self {
        Self {
            op,
            parents: [Some(l), Some(r)],
            val,
            adj: 0.0,
        }
    }
}
