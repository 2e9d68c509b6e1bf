//! Finite-difference validation of tape-computed gradients.
//!
//! For every expression built purely from the operator set, the analytical
//! gradient from the backward pass must match a central-difference
//! approximation at the same point.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tapegrad::prelude::*;

const H: f64 = 1e-6;

/// An expression builder over tape values at some evaluation point.
type BuildFn = for<'t> fn(&[Var<'t>]) -> Var<'t>;

/// Evaluates `build` at `point` on a fresh tape, forward only.
fn eval(build: BuildFn, point: &[f64]) -> f64 {
    let tape = Tape::new();
    let vars: Vec<Var<'_>> = point.iter().map(|&v| tape.var(v)).collect();
    build(&vars).value()
}

/// Compares the backward-pass gradient against central differences.
fn check_gradients(build: BuildFn, point: &[f64]) {
    let tape = Tape::new();
    let vars: Vec<Var<'_>> = point.iter().map(|&v| tape.var(v)).collect();
    let y = build(&vars);
    y.backward().unwrap();

    for (i, var) in vars.iter().enumerate() {
        let mut lo = point.to_vec();
        let mut hi = point.to_vec();
        lo[i] -= H;
        hi[i] += H;
        let numerical = (eval(build, &hi) - eval(build, &lo)) / (2.0 * H);
        let analytical = var.grad().unwrap();
        assert_relative_eq!(analytical, numerical, max_relative = 1e-5, epsilon = 1e-7);
    }
}

#[test]
fn product_plus_shared_term() {
    // y = x1*x2 + x1 at (3, 4): value 15, grads (5, 3).
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0] * v[1] + v[0]
    }
    let tape = Tape::new();
    let x1 = tape.var(3.0);
    let x2 = tape.var(4.0);
    let y = expr(&[x1, x2]);
    assert_eq!(y.value(), 15.0);
    y.backward().unwrap();
    assert_eq!(x1.grad().unwrap(), 5.0);
    assert_eq!(x2.grad().unwrap(), 3.0);

    check_gradients(expr, &[3.0, 4.0]);
}

#[test]
fn polynomial_in_two_variables() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0].powi(3).unwrap() * v[1] + v[1].powi(2).unwrap() - 2.0 * v[0]
    }
    check_gradients(expr, &[1.3, -0.7]);
}

#[test]
fn trig_and_exponential_chain() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        (v[0].sin() * v[1].cos()).exp()
    }
    check_gradients(expr, &[0.4, 1.1]);
}

#[test]
fn quotients_and_logs() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0].div(v[1]).unwrap().ln().unwrap() + v[1].sqrt().unwrap()
    }
    check_gradients(expr, &[2.5, 0.8]);
}

#[test]
fn tanh_saturating_composition() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        (v[0] * v[0] - v[1]).tanh() * 3.0
    }
    check_gradients(expr, &[0.9, 0.2]);
}

#[test]
fn variable_exponent_power() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0].pow(v[1]).unwrap()
    }
    check_gradients(expr, &[1.7, 2.3]);
}

#[test]
fn min_max_pick_one_branch() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0].max(v[1]) + v[0].min(v[1]) * 2.0
    }
    check_gradients(expr, &[1.0, 2.0]);
}

#[test]
fn random_points_through_a_deep_expression() {
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        let ratio = v[0].div(v[1]).unwrap();
        let mix = ratio.ln().unwrap() + (v[0] * v[1]).sqrt().unwrap();
        mix.tanh() + mix.exp() * 0.1
    }
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        // Keep operands inside every operator's domain: positive and away
        // from zero.
        let point = [rng.gen_range(0.5..3.0), rng.gen_range(0.5..3.0)];
        check_gradients(expr, &point);
    }
}

#[test]
fn aliased_inputs_accumulate_both_paths() {
    // y = x * x exercises two parent links into the same leaf.
    fn expr<'t>(v: &[Var<'t>]) -> Var<'t> {
        v[0] * v[0]
    }
    check_gradients(expr, &[1.5]);
}
