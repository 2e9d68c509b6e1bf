//! The recording tape: an append-only arena of nodes.
//!
//! The tape owns every node for the duration of one computation. Nodes are
//! appended in evaluation order, so the sequence is topologically pre-ordered
//! by construction: a node's parents always carry smaller indices. The
//! backward pass is therefore a plain reverse linear scan, no sort and no
//! visited set.
//!
//! A tape is deliberately single-threaded (`RefCell` interior mutability, so
//! value handles can record through a shared reference). Parallel training
//! wants one tape per worker and external gradient aggregation instead.

use std::cell::RefCell;

use crate::errors::{AdError, Result};
use crate::node::{Node, NodeIndex, Op};
use crate::var::Var;

/// A reverse-mode recording tape.
///
/// # Example
/// ```
/// use tapegrad::prelude::*;
///
/// let tape = Tape::new();
/// let x1 = tape.var(3.0);
/// let x2 = tape.var(4.0);
/// let y = x1 * x2 + x1;
/// assert_eq!(y.value(), 15.0);
///
/// y.backward()?;
/// assert_eq!(x1.grad()?, 5.0);
/// assert_eq!(x2.grad()?, 3.0);
/// # tapegrad::Result::Ok(())
/// ```
#[derive(Debug, Default)]
pub struct Tape {
    nodes: RefCell<Vec<Node>>,
}

impl Tape {
    /// Creates an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tape pre-allocated for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    /// Number of nodes currently recorded.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Returns whether the tape holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Records a leaf holding `value` and returns a handle to it.
    pub fn var(&self, value: f64) -> Var<'_> {
        let idx = self.push(Node::leaf(value));
        Var::new(self, idx, value)
    }

    /// Appends a node without validation.
    ///
    /// Callers guarantee that every parent index was issued by this tape,
    /// which the `Var` operators do by construction.
    #[inline]
    pub(crate) fn push(&self, node: Node) -> NodeIndex {
        let mut nodes = self.nodes.borrow_mut();
        let idx = NodeIndex(nodes.len());
        nodes.push(node);
        idx
    }

    /// Records an operation node with up to two parent links.
    ///
    /// Each link pairs a parent index with the local derivative of `value`
    /// with respect to that parent. Fails with [`AdError::InvalidParent`] if
    /// any parent index is not on the tape yet.
    ///
    /// # Panics
    /// Panics if more than two parent links are supplied.
    pub fn record(
        &self,
        op: Op,
        parents: &[(NodeIndex, f64)],
        value: f64,
    ) -> Result<NodeIndex> {
        assert!(
            parents.len() <= 2,
            "a node has at most two parents, got {}",
            parents.len()
        );
        let len = self.len();
        let mut links = [None, None];
        for (slot, &(parent, deriv)) in links.iter_mut().zip(parents) {
            if parent.0 >= len {
                return Err(AdError::InvalidParent {
                    parent: parent.0,
                    len,
                });
            }
            *slot = Some((parent, deriv));
        }
        Ok(self.push(Node {
            op,
            parents: links,
            val: value,
            adj: 0.0,
        }))
    }

    /// Returns the forward value cached for `index`.
    pub fn value(&self, index: NodeIndex) -> Result<f64> {
        self.node(index).map(|n| n.val)
    }

    /// Returns the adjoint accumulated for `index`.
    ///
    /// Reads through a handle issued before [`clear`](Self::clear) fail with
    /// [`AdError::NodeNotOnTape`] rather than returning stale data.
    pub fn grad(&self, index: NodeIndex) -> Result<f64> {
        self.node(index).map(|n| n.adj)
    }

    fn node(&self, index: NodeIndex) -> Result<Node> {
        self.nodes
            .borrow()
            .get(index.0)
            .cloned()
            .ok_or(AdError::NodeNotOnTape {
                index: index.0,
                len: self.len(),
            })
    }

    /// Propagates adjoints from `root` back to the start of the tape.
    ///
    /// Seeds a per-pass adjoint of 1.0 at the root, then walks indices in
    /// strictly decreasing order, adding `local_derivative * adjoint` into
    /// each parent. The pass runs in a scratch buffer and is added into the
    /// persistent adjoints at the end, so repeated calls without
    /// [`zero_grad`](Self::zero_grad) accumulate exactly one full set of
    /// gradients each — intermediate adjoints left over from an earlier pass
    /// are never re-propagated.
    pub fn backward(&self, root: NodeIndex) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if root.0 >= nodes.len() {
            return Err(AdError::NodeNotOnTape {
                index: root.0,
                len: nodes.len(),
            });
        }
        log::trace!("backward from {:?} over {} nodes", root, root.0 + 1);
        let mut scratch = vec![0.0; root.0 + 1];
        scratch[root.0] = 1.0;
        for i in (0..=root.0).rev() {
            // scratch[i] is final here: every contributor has a larger index.
            let adj = scratch[i];
            for (parent, deriv) in nodes[i].parents.iter().flatten() {
                scratch[parent.0] += deriv * adj;
            }
            nodes[i].adj += adj;
        }
        Ok(())
    }

    /// Resets every adjoint to zero, keeping the recorded nodes.
    pub fn zero_grad(&self) {
        for node in self.nodes.borrow_mut().iter_mut() {
            node.adj = 0.0;
        }
    }

    /// Drops all nodes, invalidating every previously issued handle.
    ///
    /// A handle used after `clear` is a caller error; gradient reads through
    /// one fail with [`AdError::NodeNotOnTape`].
    pub fn clear(&self) {
        let mut nodes = self.nodes.borrow_mut();
        log::trace!("clearing tape of {} nodes", nodes.len());
        nodes.clear();
    }
}
