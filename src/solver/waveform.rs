//! Time-domain waveforms produced by the inverse Laplace transform.

use std::fmt;

use num_complex::Complex64;

use crate::expr::format_number;

/// Poles closer to the real axis than this (relative) print as real.
const REAL_AXIS_TOLERANCE: f64 = 1e-12;

/// One pole's contribution: `Σ_k coeffs[k]·t^k·e^(pole·t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoleTerm {
    pub pole: Complex64,
    /// Coefficient of `t^k·e^(pole·t)` at index `k`
    pub coeffs: Vec<Complex64>,
}

impl PoleTerm {
    fn eval(&self, t: f64) -> Complex64 {
        let poly = self
            .coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * t + c);
        poly * (self.pole * t).exp()
    }
}

/// A causal waveform `f(t)·u(t)`: zero for `t < 0`, a sum of exponential
/// modes for `t >= 0`.
///
/// Complex poles come in conjugate pairs, so the sum is real; evaluation
/// keeps the real part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeWaveform {
    terms: Vec<PoleTerm>,
    impulse_removed: bool,
}

impl TimeWaveform {
    pub fn new(terms: Vec<PoleTerm>, impulse_removed: bool) -> Self {
        Self {
            terms,
            impulse_removed,
        }
    }

    /// The identically zero waveform.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[PoleTerm] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether Dirac terms at `t = 0` were dropped from this waveform.
    pub fn impulse_removed(&self) -> bool {
        self.impulse_removed
    }

    /// Value at `t`. May be non-finite when a growing mode overflows.
    pub fn evaluate(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        self.terms
            .iter()
            .map(|term| term.eval(t))
            .sum::<Complex64>()
            .re
    }

    /// Value at `t`, or `None` if `t` or the result is not finite.
    pub fn try_evaluate(&self, t: f64) -> Option<f64> {
        if !t.is_finite() {
            return None;
        }
        let value = self.evaluate(t);
        value.is_finite().then_some(value)
    }

    /// Limit as `t -> ∞`, if the waveform settles.
    ///
    /// Every mode must decay except at most a simple pole at the origin,
    /// whose coefficient is the final value.
    pub fn final_value(&self) -> Option<f64> {
        let scale = self.terms.iter().fold(0.0_f64, |m, t| m.max(t.pole.norm()));
        let mut value = 0.0;
        for term in &self.terms {
            if term.pole.norm() <= REAL_AXIS_TOLERANCE * scale {
                if term.coeffs.len() > 1 {
                    return None;
                }
                value += term.coeffs.first().map_or(0.0, |c| c.re);
            } else if term.pole.re >= 0.0 {
                return None;
            }
        }
        Some(value)
    }
}

impl fmt::Display for TimeWaveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for term in &self.terms {
            let tol = REAL_AXIS_TOLERANCE * term.pole.norm();
            if term.pole.im < -tol {
                // Printed together with its conjugate
                continue;
            }
            let oscillating = term.pole.im > tol;

            let mut factors = Vec::new();
            for (k, c) in term.coeffs.iter().enumerate() {
                if oscillating {
                    // 2·Re(c·e^(iωt)) = 2·Re(c)·cos(ωt) - 2·Im(c)·sin(ωt)
                    let w = format_number(term.pole.im);
                    let pair = [
                        format!("{}·cos({}·t)", format_number(2.0 * c.re), w),
                        format!("{}·sin({}·t)", format_number(-2.0 * c.im), w),
                    ];
                    factors.push(format!("{}({})", power_prefix(k), join_signed(&pair)));
                } else if c.re != 0.0 {
                    factors.push(format!("{}{}", format_number(c.re), power_suffix(k)));
                }
            }
            if factors.is_empty() {
                continue;
            }

            let body = join_signed(&factors);
            if term.pole.re == 0.0 {
                parts.push(body);
            } else {
                let body = if factors.len() > 1 { format!("({})", body) } else { body };
                parts.push(format!("{}·e^({}·t)", body, format_number(term.pole.re)));
            }
        }

        if parts.is_empty() {
            parts.push("0".to_string());
        }
        write!(f, "[{}]·u(t)", join_signed(&parts))?;
        if self.impulse_removed {
            write!(f, " (impulse at t = 0 removed)")?;
        }
        Ok(())
    }
}

fn power_prefix(k: usize) -> String {
    match k {
        0 => String::new(),
        1 => "t·".to_string(),
        _ => format!("t^{}·", k),
    }
}

fn power_suffix(k: usize) -> String {
    match k {
        0 => String::new(),
        1 => "·t".to_string(),
        _ => format!("·t^{}", k),
    }
}

/// Join terms with `+`, folding a leading minus into the operator.
fn join_signed(parts: &[String]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        match (i, part.strip_prefix('-')) {
            (0, _) => out.push_str(part),
            (_, Some(rest)) => {
                out.push_str(" - ");
                out.push_str(rest);
            }
            (_, None) => {
                out.push_str(" + ");
                out.push_str(part);
            }
        }
    }
    out
}
