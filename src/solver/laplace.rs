//! Inverse Laplace transform of rational node expressions.
//!
//! A proper rational function `N(s)/D(s)` expands into partial fractions
//! over the poles of `D`. For a pole `p` of multiplicity `m` write
//! `F(s) = G(s) / (s - p)^m`; with `h = s - p` the coefficients of the
//! principal part are the first `m` Taylor coefficients of `G(p + h)`, and
//!
//! ```text
//! c / (s - p)^j   <->   c · t^(j-1) / (j-1)! · e^(p·t) · u(t)
//! ```
//!
//! A non-proper expression also carries a polynomial part, which maps to
//! `δ(t)` and its derivatives. Those terms only act at `t = 0` and are
//! dropped from the waveform.

use num_complex::Complex64;

use crate::expr::Rational;

use super::waveform::{PoleTerm, TimeWaveform};

/// A cluster of numerically coincident poles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PoleCluster {
    pole: Complex64,
    multiplicity: usize,
}

/// Inverse transform of `expr`, causal by construction.
///
/// Poles within `cluster_tolerance` of each other (relative to their
/// magnitude) are merged into one repeated pole.
pub fn to_time_domain(expr: &Rational, cluster_tolerance: f64) -> TimeWaveform {
    if expr.is_zero() {
        return TimeWaveform::zero();
    }

    let impulse_removed = !expr.is_proper();
    if impulse_removed {
        tracing::debug!(expr = %expr, "dropping impulse terms at t = 0");
    }

    let zeros = expr.zeros();
    let clusters = cluster_poles(expr.poles(), cluster_tolerance);
    let gain = Complex64::new(expr.gain(), 0.0);

    let terms = clusters
        .iter()
        .enumerate()
        .map(|(index, cluster)| {
            let m = cluster.multiplicity;
            let p = cluster.pole;

            // Taylor series of G(p + h), truncated to order m - 1
            let mut num = vec![gain];
            for &z in &zeros {
                num = multiply_truncated(&num, &[p - z, Complex64::new(1.0, 0.0)], m);
            }
            let mut den = vec![Complex64::new(1.0, 0.0)];
            for (other_index, other) in clusters.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                for _ in 0..other.multiplicity {
                    den = multiply_truncated(&den, &[p - other.pole, Complex64::new(1.0, 0.0)], m);
                }
            }
            let g = divide_series(&num, &den, m);

            // g[m - j] multiplies 1/(s - p)^j, i.e. t^(j-1)/(j-1)!
            let mut factorial = 1.0;
            let coeffs = (0..m)
                .map(|k| {
                    if k > 0 {
                        factorial *= k as f64;
                    }
                    g[m - 1 - k] / factorial
                })
                .collect();

            PoleTerm { pole: p, coeffs }
        })
        .collect();

    TimeWaveform::new(terms, impulse_removed)
}

/// Group poles that lie within `tol` of each other, relative to their
/// magnitude, replacing each group by its mean. Groups that straddle the
/// real axis snap onto it.
///
/// The test is purely relative: an exact pole at the origin only groups
/// with other exact zeros, however slow the nearest nonzero pole is.
fn cluster_poles(poles: Vec<Complex64>, tol: f64) -> Vec<PoleCluster> {
    let mut groups: Vec<Vec<Complex64>> = Vec::new();
    for p in poles {
        let near = groups.iter().position(|group| {
            let center = mean(group);
            (p - center).norm() <= tol * p.norm().max(center.norm())
        });
        match near {
            Some(i) => groups[i].push(p),
            None => groups.push(vec![p]),
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let mut pole = mean(&group);
            if pole.im.abs() <= tol * pole.norm() {
                pole.im = 0.0;
            }
            PoleCluster {
                pole,
                multiplicity: group.len(),
            }
        })
        .collect()
}

fn mean(group: &[Complex64]) -> Complex64 {
    group.iter().sum::<Complex64>() / group.len() as f64
}

/// Product of two power series, keeping the first `len` coefficients.
fn multiply_truncated(a: &[Complex64], b: &[Complex64], len: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); (a.len() + b.len() - 1).min(len)];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            if i + j < out.len() {
                out[i + j] += x * y;
            }
        }
    }
    out
}

/// First `len` coefficients of `num / den`; `den[0]` must be non-zero.
fn divide_series(num: &[Complex64], den: &[Complex64], len: usize) -> Vec<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let mut q = Vec::with_capacity(len);
    for k in 0..len {
        let mut acc = num.get(k).copied().unwrap_or(zero);
        for j in 1..=k {
            acc -= den.get(j).copied().unwrap_or(zero) * q[k - j];
        }
        q.push(acc / den[0]);
    }
    q
}
