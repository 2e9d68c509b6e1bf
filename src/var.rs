//! Differentiable value handles.
//!
//! A [`Var`] is a lightweight, copyable handle: a node index plus a reference
//! to the owning tape, with the forward value cached so that building an
//! expression never has to read back through the tape. Several handles may
//! alias the same node; the tape owns all node storage.

use core::fmt;
use std::cmp::Ordering;

use crate::errors::Result;
use crate::node::{Node, NodeIndex, Op};
use crate::ops;
use crate::tape::Tape;

/// A scalar value tracked on an automatic differentiation tape.
///
/// Operations on `Var` compute the forward value and the local derivatives
/// in the same pass and append one node to the tape. Total operations are
/// available as `std::ops` overloads; operations with a restricted domain
/// (`div`, `ln`, `sqrt`, the power family) return [`Result`] instead, so a
/// rejected input surfaces as an error rather than a NaN.
#[derive(Clone, Copy)]
pub struct Var<'t> {
    tape: &'t Tape,
    idx: NodeIndex,
    val: f64,
}

impl fmt::Debug for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({}, {:?})", self.val, self.idx)
    }
}

impl fmt::Display for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({})", self.val)
    }
}

impl<'t> Var<'t> {
    #[inline]
    pub(crate) fn new(tape: &'t Tape, idx: NodeIndex, val: f64) -> Self {
        Self { tape, idx, val }
    }

    #[inline]
    /// Returns the cached forward value.
    pub fn value(&self) -> f64 {
        self.val
    }

    #[inline]
    /// Returns this value's index on the tape.
    pub fn index(&self) -> NodeIndex {
        self.idx
    }

    #[inline]
    /// Returns the tape this value is recorded on.
    pub fn tape(&self) -> &'t Tape {
        self.tape
    }

    /// Returns the gradient accumulated for this value.
    ///
    /// Before any backward pass this is the initialized adjoint, 0.0. After
    /// [`Tape::clear`] the handle is stale and the read fails.
    pub fn grad(&self) -> Result<f64> {
        self.tape.grad(self.idx)
    }

    /// Runs a backward pass from this value to the start of the tape.
    pub fn backward(&self) -> Result<()> {
        self.tape.backward(self.idx)
    }

    /// Records a total binary operation between two tape values.
    ///
    /// # Panics
    /// Panics if the operands live on different tapes.
    pub(crate) fn total_binary(self, rhs: Var<'t>, op: Op) -> Var<'t> {
        match self.try_binary(rhs, op) {
            Ok(out) => out,
            // total operators carry no domain check
            Err(err) => unreachable!("{err}"),
        }
    }

    pub(crate) fn try_binary(self, rhs: Var<'t>, op: Op) -> Result<Var<'t>> {
        assert!(
            std::ptr::eq(self.tape, rhs.tape),
            "operands were recorded on different tapes"
        );
        let (val, dl, dr) = ops::binary_rule(op, self.val, rhs.val)?;
        let idx = self
            .tape
            .push(Node::binary(op, (self.idx, dl), (rhs.idx, dr), val));
        Ok(Var::new(self.tape, idx, val))
    }

    /// Records `self op constant`. Constants contribute no adjoint, so the
    /// node carries a single parent link.
    pub(crate) fn total_scalar_rhs(self, c: f64, op: Op) -> Var<'t> {
        match ops::binary_rule(op, self.val, c) {
            Ok((val, dl, _)) => {
                let idx = self.tape.push(Node::unary(op, self.idx, dl, val));
                Var::new(self.tape, idx, val)
            }
            Err(err) => unreachable!("{err}"),
        }
    }

    /// Records `constant op self`.
    pub(crate) fn total_scalar_lhs(self, c: f64, op: Op) -> Var<'t> {
        match ops::binary_rule(op, c, self.val) {
            Ok((val, _, dr)) => {
                let idx = self.tape.push(Node::unary(op, self.idx, dr, val));
                Var::new(self.tape, idx, val)
            }
            Err(err) => unreachable!("{err}"),
        }
    }

    pub(crate) fn total_unary(self, op: Op) -> Var<'t> {
        match self.try_unary(op) {
            Ok(out) => out,
            Err(err) => unreachable!("{err}"),
        }
    }

    pub(crate) fn try_unary(self, op: Op) -> Result<Var<'t>> {
        let (val, deriv) = ops::unary_rule(op, self.val)?;
        let idx = self.tape.push(Node::unary(op, self.idx, deriv, val));
        Ok(Var::new(self.tape, idx, val))
    }

    #[inline]
    /// Returns `e^x` for this value.
    pub fn exp(self) -> Var<'t> {
        self.total_unary(Op::Exp)
    }

    #[inline]
    /// Returns the natural logarithm; fails for a non-positive operand.
    pub fn ln(self) -> Result<Var<'t>> {
        self.try_unary(Op::Log)
    }

    #[inline]
    /// Returns the square root; fails for a non-positive operand.
    pub fn sqrt(self) -> Result<Var<'t>> {
        self.try_unary(Op::Sqrt)
    }

    #[inline]
    /// Returns the sine of this value.
    pub fn sin(self) -> Var<'t> {
        self.total_unary(Op::Sin)
    }

    #[inline]
    /// Returns the cosine of this value.
    pub fn cos(self) -> Var<'t> {
        self.total_unary(Op::Cos)
    }

    #[inline]
    /// Returns the hyperbolic tangent of this value.
    pub fn tanh(self) -> Var<'t> {
        self.total_unary(Op::Tanh)
    }

    #[inline]
    /// Returns the absolute value.
    pub fn abs(self) -> Var<'t> {
        self.total_unary(Op::Abs)
    }

    /// Divides by another tape value; fails for a zero divisor.
    ///
    /// Division is not a `std::ops` overload because it is fallible: a zero
    /// divisor must surface as an error, never as a silent infinity.
    #[inline]
    pub fn div(self, rhs: Var<'t>) -> Result<Var<'t>> {
        self.try_binary(rhs, Op::Div)
    }

    /// Raises this value to a constant power.
    ///
    /// Fails for a non-integer exponent with a negative base, and for a zero
    /// base where value or derivative would not be finite.
    pub fn powf(self, n: f64) -> Result<Var<'t>> {
        let (val, deriv) = ops::pow_const_rule(self.val, n)?;
        let idx = self.tape.push(Node::unary(Op::Pow, self.idx, deriv, val));
        Ok(Var::new(self.tape, idx, val))
    }

    #[inline]
    /// Raises this value to a constant integer power.
    pub fn powi(self, n: i32) -> Result<Var<'t>> {
        self.powf(f64::from(n))
    }

    #[inline]
    /// Raises this value to the power of another tape value; the derivative
    /// with respect to the exponent needs `ln` of the base, so the base must
    /// be positive.
    pub fn pow(self, rhs: Var<'t>) -> Result<Var<'t>> {
        self.try_binary(rhs, Op::Pow)
    }

    #[inline]
    /// Returns the maximum of two tape values.
    pub fn max(self, rhs: Var<'t>) -> Var<'t> {
        self.total_binary(rhs, Op::Max)
    }

    #[inline]
    /// Returns the minimum of two tape values.
    pub fn min(self, rhs: Var<'t>) -> Var<'t> {
        self.total_binary(rhs, Op::Min)
    }
}

impl PartialEq for Var<'_> {
    fn eq(&self, o: &Self) -> bool {
        self.val == o.val
    }
}
impl PartialOrd for Var<'_> {
    fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
        self.val.partial_cmp(&o.val)
    }
}
impl PartialEq<f64> for Var<'_> {
    fn eq(&self, o: &f64) -> bool {
        self.val == *o
    }
}
impl PartialOrd<f64> for Var<'_> {
    fn partial_cmp(&self, o: &f64) -> Option<Ordering> {
        self.val.partial_cmp(o)
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::AdError;
    use crate::tape::Tape;
    use approx::assert_relative_eq;

    #[test]
    fn grad_is_zero_before_backward() {
        let tape = Tape::new();
        let x = tape.var(2.0);
        assert_eq!(x.grad().unwrap(), 0.0);
    }

    #[test]
    fn rejected_operation_records_nothing() {
        let tape = Tape::new();
        let x = tape.var(-1.0);
        let before = tape.len();
        let err = x.ln().unwrap_err();
        assert_eq!(err, AdError::Domain { op: "log", value: -1.0 });
        assert_eq!(tape.len(), before);
    }

    #[test]
    fn chained_elementary_functions() {
        // f(x) = exp(sin(x)), f'(x) = cos(x) * exp(sin(x))
        let tape = Tape::new();
        let x = tape.var(0.5);
        let y = x.sin().exp();
        y.backward().unwrap();
        let expected = 0.5f64.cos() * 0.5f64.sin().exp();
        assert_relative_eq!(x.grad().unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn pow_of_variable_exponent_needs_positive_base() {
        let tape = Tape::new();
        let x = tape.var(-2.0);
        let n = tape.var(3.0);
        assert!(x.pow(n).is_err());
        // A constant integer exponent is fine for the same base.
        assert_relative_eq!(x.powi(3).unwrap().value(), -8.0);
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let tape = Tape::new();
        let a = tape.var(1.0);
        let b = tape.var(0.0);
        assert!(a.div(b).is_err());
    }

    #[test]
    fn value_comparisons_ignore_tape_identity() {
        let tape = Tape::new();
        let a = tape.var(1.5);
        let b = tape.var(1.5);
        assert_eq!(a, b);
        assert!(a > 1.0);
    }

    #[test]
    #[should_panic(expected = "different tapes")]
    fn mixing_tapes_panics() {
        let t1 = Tape::new();
        let t2 = Tape::new();
        let a = t1.var(1.0);
        let b = t2.var(2.0);
        let _ = a * b;
    }
}
