//! Rational-expression engine for the Laplace domain.
//!
//! Node voltages of a lumped R/L/C network are rational functions of the
//! complex frequency `s`. This module provides the small algebra needed to
//! build, combine and simplify them:
//!
//! - [`Poly`] - real polynomial in `s`, ascending coefficient order
//! - [`Rational`] - ratio of two polynomials, with root-based simplification
//! - [`find_roots`] - polynomial roots from companion-matrix eigenvalues
//!
//! Coefficients are `f64`. Exact zeros produced by structural cancellation
//! (for example an `s` factor introduced by an inductor row) stay exact, so
//! zero roots are split off without going through the eigenvalue solver.

mod poly;
mod rational;
mod roots;

pub use poly::Poly;
pub use rational::Rational;
pub use roots::find_roots;

/// Format a coefficient compactly for expression display.
pub(crate) fn format_number(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let magnitude = x.abs();
    if (1e-3..1e6).contains(&magnitude) {
        let text = format!("{:.6}", x);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        text.to_string()
    } else {
        format!("{:.4e}", x)
    }
}
