//! `std::ops` overloads for [`Var`].
//!
//! Only total operators are overloaded: `+`, `-`, `*` and unary negation,
//! each with `f64` permitted on either side. Division has a domain
//! restriction and therefore lives on [`Var::div`] as a fallible method.

use crate::node::Op;
use crate::var::Var;
use std::ops::*;

macro_rules! impl_total_bin_op {
    ($Trait:ident, $func:ident, $op:expr) => {
        impl<'t> $Trait for Var<'t> {
            type Output = Var<'t>;
            fn $func(self, rhs: Var<'t>) -> Var<'t> {
                self.total_binary(rhs, $op)
            }
        }
        impl<'t> $Trait<f64> for Var<'t> {
            type Output = Var<'t>;
            fn $func(self, rhs: f64) -> Var<'t> {
                self.total_scalar_rhs(rhs, $op)
            }
        }
        impl<'t> $Trait<Var<'t>> for f64 {
            type Output = Var<'t>;
            fn $func(self, rhs: Var<'t>) -> Var<'t> {
                rhs.total_scalar_lhs(self, $op)
            }
        }
    };
}

impl_total_bin_op!(Add, add, Op::Add);
impl_total_bin_op!(Sub, sub, Op::Sub);
impl_total_bin_op!(Mul, mul, Op::Mul);

impl<'t> Neg for Var<'t> {
    type Output = Var<'t>;
    fn neg(self) -> Var<'t> {
        self.total_unary(Op::Neg)
    }
}

macro_rules! impl_assign_op {
    ($Trait:ident, $func:ident, $sym:tt) => {
        impl<'t> $Trait<Var<'t>> for Var<'t> {
            fn $func(&mut self, rhs: Var<'t>) {
                *self = *self $sym rhs;
            }
        }
        impl $Trait<f64> for Var<'_> {
            fn $func(&mut self, rhs: f64) {
                *self = *self $sym rhs;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, +);
impl_assign_op!(SubAssign, sub_assign, -);
impl_assign_op!(MulAssign, mul_assign, *);

#[cfg(test)]
mod tests {
    use crate::tape::Tape;
    use approx::assert_relative_eq;

    #[test]
    fn scalar_operands_on_either_side() {
        let tape = Tape::new();
        let x = tape.var(3.0);
        let y = 2.0 * x + 1.0;
        let z = 10.0 - y;
        z.backward().unwrap();
        assert_eq!(z.value(), 3.0);
        assert_eq!(x.grad().unwrap(), -2.0);
    }

    #[test]
    fn compound_assignment_accumulates_on_the_tape() {
        let tape = Tape::new();
        let x = tape.var(2.0);
        let mut acc = tape.var(0.0);
        acc += x * x;
        acc += x;
        acc.backward().unwrap();
        assert_eq!(acc.value(), 6.0);
        assert_relative_eq!(x.grad().unwrap(), 5.0);
    }

    #[test]
    fn negation_flips_the_gradient() {
        let tape = Tape::new();
        let x = tape.var(4.0);
        let y = -x;
        y.backward().unwrap();
        assert_eq!(y.value(), -4.0);
        assert_eq!(x.grad().unwrap(), -1.0);
    }
}
