//! Forward rules, local-derivative rules and domain checks for the operator
//! set.
//!
//! Each rule evaluates the forward value and the local derivative(s) with
//! respect to each operand in one pass over the operand values, so recording
//! an operation never needs a second forward traversal. Operations applied
//! outside their real-valued domain are rejected with [`AdError::Domain`]
//! before anything reaches the tape.

use crate::errors::{AdError, Result};
use crate::node::Op;

/// Evaluates a binary rule, returning `(value, d/dl, d/dr)`.
///
/// | op  | value    | d/dl          | d/dr          |
/// |-----|----------|---------------|---------------|
/// | add | l + r    | 1             | 1             |
/// | sub | l - r    | 1             | -1            |
/// | mul | l * r    | r             | l             |
/// | div | l / r    | 1/r           | -l/r²         |
/// | pow | l^r      | r·l^(r-1)     | l^r·ln l      |
/// | max | max(l,r) | [l > r]       | [r > l]       |
/// | min | min(l,r) | [l < r]       | [r < l]       |
///
/// `div` fails for a zero divisor and `pow` for a non-positive base, since
/// the derivative with respect to a variable exponent needs `ln l`.
pub(crate) fn binary_rule(op: Op, l: f64, r: f64) -> Result<(f64, f64, f64)> {
    match op {
        Op::Add => Ok((l + r, 1.0, 1.0)),
        Op::Sub => Ok((l - r, 1.0, -1.0)),
        Op::Mul => Ok((l * r, r, l)),
        Op::Div => {
            if r == 0.0 {
                return Err(AdError::Domain {
                    op: "div",
                    value: r,
                });
            }
            Ok((l / r, 1.0 / r, -l / (r * r)))
        }
        Op::Pow => {
            if l <= 0.0 {
                return Err(AdError::Domain {
                    op: "pow",
                    value: l,
                });
            }
            let v = l.powf(r);
            Ok((v, r * l.powf(r - 1.0), v * l.ln()))
        }
        Op::Max => {
            let (dl, dr) = if l > r { (1.0, 0.0) } else { (0.0, 1.0) };
            Ok((l.max(r), dl, dr))
        }
        Op::Min => {
            let (dl, dr) = if l < r { (1.0, 0.0) } else { (0.0, 1.0) };
            Ok((l.min(r), dl, dr))
        }
        op => unreachable!("not a binary operator: {op:?}"),
    }
}

/// Evaluates a unary rule, returning `(value, d/dx)`.
///
/// | op   | value   | d/dx         |
/// |------|---------|--------------|
/// | neg  | -x      | -1           |
/// | exp  | e^x     | e^x          |
/// | log  | ln x    | 1/x          |
/// | sqrt | √x      | 1/(2√x)      |
/// | sin  | sin x   | cos x        |
/// | cos  | cos x   | -sin x       |
/// | tanh | tanh x  | 1 - tanh²x   |
/// | abs  | \|x\|   | sign x       |
///
/// `log` and `sqrt` fail for non-positive operands.
pub(crate) fn unary_rule(op: Op, x: f64) -> Result<(f64, f64)> {
    match op {
        Op::Neg => Ok((-x, -1.0)),
        Op::Exp => {
            let v = x.exp();
            Ok((v, v))
        }
        Op::Log => {
            if x <= 0.0 {
                return Err(AdError::Domain {
                    op: "log",
                    value: x,
                });
            }
            Ok((x.ln(), 1.0 / x))
        }
        Op::Sqrt => {
            if x <= 0.0 {
                return Err(AdError::Domain {
                    op: "sqrt",
                    value: x,
                });
            }
            let v = x.sqrt();
            Ok((v, 0.5 / v))
        }
        Op::Sin => Ok((x.sin(), x.cos())),
        Op::Cos => Ok((x.cos(), -x.sin())),
        Op::Tanh => {
            let v = x.tanh();
            Ok((v, 1.0 - v * v))
        }
        Op::Abs => Ok((x.abs(), if x >= 0.0 { 1.0 } else { -1.0 })),
        op => unreachable!("not a unary operator: {op:?}"),
    }
}

/// Evaluates the power rule for a constant exponent, returning `(value, d/dx)`.
///
/// Unlike [`binary_rule`] with [`Op::Pow`], a constant exponent never needs
/// `ln x`, so negative bases are fine as long as the exponent is an integer.
/// Rejected cases: non-integer exponent with a negative base, and a zero base
/// whenever `x^(n-1)` would not be finite.
pub(crate) fn pow_const_rule(x: f64, n: f64) -> Result<(f64, f64)> {
    if n == 0.0 {
        return Ok((1.0, 0.0));
    }
    if x < 0.0 && n.fract() != 0.0 {
        return Err(AdError::Domain {
            op: "powf",
            value: x,
        });
    }
    if x == 0.0 && n < 1.0 {
        return Err(AdError::Domain {
            op: "powf",
            value: x,
        });
    }
    Ok((x.powf(n), n * x.powf(n - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mul_partials_are_the_swapped_operands() {
        let (v, dl, dr) = binary_rule(Op::Mul, 3.0, 4.0).unwrap();
        assert_eq!(v, 12.0);
        assert_eq!(dl, 4.0);
        assert_eq!(dr, 3.0);
    }

    #[test]
    fn div_rejects_zero_divisor() {
        let err = binary_rule(Op::Div, 1.0, 0.0).unwrap_err();
        assert_eq!(err, AdError::Domain { op: "div", value: 0.0 });
    }

    #[test]
    fn log_rejects_nonpositive_operands() {
        assert!(unary_rule(Op::Log, 0.0).is_err());
        assert!(unary_rule(Op::Log, -1.0).is_err());
        let (v, d) = unary_rule(Op::Log, 2.0).unwrap();
        assert_relative_eq!(v, std::f64::consts::LN_2);
        assert_relative_eq!(d, 0.5);
    }

    #[test]
    fn pow_const_allows_negative_base_with_integer_exponent() {
        let (v, d) = pow_const_rule(-2.0, 3.0).unwrap();
        assert_relative_eq!(v, -8.0);
        assert_relative_eq!(d, 12.0);
        assert!(pow_const_rule(-2.0, 0.5).is_err());
        assert!(pow_const_rule(0.0, -1.0).is_err());
    }

    #[test]
    fn tanh_derivative_uses_forward_value() {
        let (v, d) = unary_rule(Op::Tanh, 0.7).unwrap();
        assert_relative_eq!(d, 1.0 - v * v);
    }
}
