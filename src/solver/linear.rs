//! Exact-form solution of the admittance system.
//!
//! The entries of `Y(s)` are rational in `s`, so the unknowns are rational
//! too. Each row is first cleared of denominators, which leaves a
//! polynomial system `A(s)·x = b(s)`. Cramer's rule then gives every unknown
//! as `det(A_i) / det(A)`; the determinants are polynomials whose degree is
//! bounded by the row degrees, so they are recovered exactly by evaluating
//! them at the roots of unity and interpolating with an FFT.
//!
//! Two scalings keep this well conditioned: `s` is rescaled to the
//! circuit's characteristic frequency so coefficients of different powers
//! are comparable, and every row is normalized to unit magnitude. The
//! singularity test is relative to Hadamard's bound on the determinant.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::circuit::{BranchId, NodeId};
use crate::error::{NodalError, Result};
use crate::expr::{Poly, Rational};

use super::mna::AdmittanceSystem;
use super::AnalysisConfig;

/// Relative precision used to recognize a repeated row denominator.
const DENOMINATOR_MATCH_TOLERANCE: f64 = 1e-12;

/// Rational node voltages and branch currents of a solved system.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVoltages {
    /// One expression per node, ground at index 0
    voltages: Vec<Rational>,
    /// One expression per voltage-source branch
    currents: Vec<Rational>,
}

impl NodeVoltages {
    /// All node voltages, ground first.
    pub fn voltages(&self) -> &[Rational] {
        &self.voltages
    }

    /// Voltage-source branch currents, in branch order.
    pub fn branch_currents(&self) -> &[Rational] {
        &self.currents
    }

    pub fn node(&self, node: NodeId) -> Option<&Rational> {
        self.voltages.get(node.0)
    }

    pub fn branch(&self, branch: BranchId) -> Option<&Rational> {
        self.currents.get(branch.0)
    }
}

/// Solve `Y(s)·x = z(s)` for every unknown.
///
/// Fails with [`NodalError::SingularSystem`] when the determinant vanishes
/// identically (floating sub-circuits, loops of voltage sources, a source
/// shorted onto itself).
pub fn solve(system: &AdmittanceSystem, config: &AnalysisConfig) -> Result<NodeVoltages> {
    let n = system.size();

    let mut rows: Vec<Vec<Poly>> = Vec::with_capacity(n);
    let mut rhs: Vec<Poly> = Vec::with_capacity(n);
    for r in 0..n {
        let entries: Vec<&Rational> = (0..n)
            .map(|c| system.get(r, c))
            .chain(std::iter::once(system.source(r)))
            .collect();
        let mut cleared = clear_denominators(&entries);
        rhs.push(cleared.pop().unwrap_or_default());
        rows.push(cleared);
    }

    let omega = characteristic_frequency(rows.iter().flatten().chain(rhs.iter()));
    tracing::debug!(omega, "frequency scaling");

    for (row, b) in rows.iter_mut().zip(rhs.iter_mut()) {
        for entry in row.iter_mut() {
            *entry = entry.rescale_variable(omega);
        }
        *b = b.rescale_variable(omega);

        let peak = row.iter().fold(0.0_f64, |m, p| m.max(p.max_abs()));
        if peak == 0.0 {
            // A node nothing connects to
            return Err(NodalError::SingularSystem);
        }
        for entry in row.iter_mut() {
            *entry = entry.scale(1.0 / peak);
        }
        *b = b.scale(1.0 / peak);
    }

    // Bounds shared by det(A) and every det(A_i)
    let degree_bound: usize = rows
        .iter()
        .zip(&rhs)
        .map(|(row, b)| {
            row.iter()
                .chain(std::iter::once(b))
                .filter_map(Poly::degree)
                .max()
                .unwrap_or(0)
        })
        .sum();
    let hadamard: f64 = rows
        .iter()
        .zip(&rhs)
        .map(|(row, b)| row.iter().map(Poly::abs_sum).sum::<f64>() + b.abs_sum())
        .product();
    let threshold = config.singular_tolerance * hadamard;
    let points = unit_circle(degree_bound + 1);
    let fft = FftPlanner::<f64>::new().plan_fft_forward(points.len());

    let det = determinant(&rows, None, &points, &*fft).chop(threshold);
    if det.is_zero() {
        tracing::debug!(hadamard, "determinant vanishes");
        return Err(NodalError::SingularSystem);
    }

    let mut unknowns = Vec::with_capacity(n);
    for i in 0..n {
        let det_i = determinant(&rows, Some((i, &rhs)), &points, &*fft).chop(threshold);
        let x = Rational::new(det_i, det.clone()).ok_or(NodalError::SingularSystem)?;
        unknowns.push(
            x.simplified(config.root_tolerance)
                .rescale_variable(1.0 / omega)
                .normalized(),
        );
    }

    let currents = unknowns.split_off(system.num_nodes());
    Ok(NodeVoltages {
        voltages: unknowns,
        currents,
    })
}

/// Multiply a row (matrix entries followed by the source entry) through by
/// the least common multiple of its denominators.
///
/// Monomial denominators `c·s^k` contribute `s^max_k`. Other denominators
/// are multiplied in once per distinct factor, where factors that differ
/// only by a constant are treated as the same.
fn clear_denominators(entries: &[&Rational]) -> Vec<Poly> {
    let mut max_shift = 0;
    let mut factors: Vec<Poly> = Vec::new();
    for entry in entries.iter().filter(|e| !e.is_zero()) {
        let den = entry.denominator();
        match den.as_monomial() {
            Some((_, k)) => max_shift = max_shift.max(k),
            None => {
                let known = factors
                    .iter()
                    .any(|f| den.ratio_to(f, DENOMINATOR_MATCH_TOLERANCE).is_some());
                if !known {
                    factors.push(den.clone());
                }
            }
        }
    }

    entries
        .iter()
        .map(|entry| {
            if entry.is_zero() {
                return Poly::zero();
            }
            let num = entry.numerator();
            let den = entry.denominator();
            if let Some((c, k)) = den.as_monomial() {
                let cleared = num.shift_up(max_shift - k).scale(1.0 / c);
                return factors.iter().fold(cleared, |acc, f| &acc * f);
            }

            let mut cleared = num.shift_up(max_shift);
            let mut own_factor_seen = false;
            for f in &factors {
                match den.ratio_to(f, DENOMINATOR_MATCH_TOLERANCE) {
                    Some(lambda) if !own_factor_seen => {
                        own_factor_seen = true;
                        cleared = cleared.scale(1.0 / lambda);
                    }
                    _ => cleared = &cleared * f,
                }
            }
            cleared
        })
        .collect()
}

/// Geometric mean of the ratio `|c_j / c_k|^(1/(k-j))` over consecutive
/// non-zero coefficients of every polynomial; 1 when nothing depends on `s`.
fn characteristic_frequency<'a>(polys: impl Iterator<Item = &'a Poly>) -> f64 {
    let mut log_sum = 0.0;
    let mut count = 0usize;
    for p in polys {
        let mut previous: Option<(usize, f64)> = None;
        for (k, &c) in p.coeffs().iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            if let Some((j, cj)) = previous {
                log_sum += (cj.abs().ln() - c.abs().ln()) / (k - j) as f64;
                count += 1;
            }
            previous = Some((k, c));
        }
    }
    if count == 0 {
        return 1.0;
    }
    let omega = (log_sum / count as f64).exp();
    if omega.is_finite() && omega > 0.0 {
        omega
    } else {
        1.0
    }
}

/// The `count` roots of unity.
fn unit_circle(count: usize) -> Vec<Complex64> {
    (0..count)
        .map(|j| Complex64::from_polar(1.0, 2.0 * PI * j as f64 / count as f64))
        .collect()
}

/// Determinant polynomial of the row system, optionally with one column
/// replaced, interpolated from its values at `points`.
///
/// `points` must be the roots of unity from [`unit_circle`] and `fft` a
/// forward plan of the same length: coefficient `k` is then bin `k` of the
/// transformed values divided by the point count.
fn determinant(
    rows: &[Vec<Poly>],
    replace: Option<(usize, &[Poly])>,
    points: &[Complex64],
    fft: &dyn Fft<f64>,
) -> Poly {
    let n = rows.len();
    let mut values: Vec<Complex64> = points
        .iter()
        .map(|&z| {
            let matrix = DMatrix::from_fn(n, n, |r, c| match replace {
                Some((col, column)) if col == c => column[r].eval_complex(z),
                _ => rows[r][c].eval_complex(z),
            });
            matrix.lu().determinant()
        })
        .collect();
    fft.process(&mut values);

    let count = points.len() as f64;
    Poly::from_coeffs(values.iter().map(|v| v.re / count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::components::{Capacitor, Resistor, VoltageSource};
    use crate::solver::{MnaBuilder, SystemBuilder};
    use approx::assert_relative_eq;

    fn solve_circuit(circuit: &Circuit) -> Result<NodeVoltages> {
        let system = MnaBuilder::default().build(circuit)?;
        solve(&system, &AnalysisConfig::default())
    }

    #[test]
    fn test_determinant_interpolation() {
        // [[s, 1], [1, s]] -> s^2 - 1
        let rows = vec![
            vec![Poly::s(), Poly::one()],
            vec![Poly::one(), Poly::s()],
        ];
        let fft = FftPlanner::<f64>::new().plan_fft_forward(3);
        let det = determinant(&rows, None, &unit_circle(3), &*fft).chop(1e-12);
        assert_relative_eq!(det.coeff(0), -1.0, epsilon = 1e-12);
        assert_relative_eq!(det.coeff(1), 0.0);
        assert_relative_eq!(det.coeff(2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_determinant_coefficient_order() {
        // [[s + 2, 1], [0, s^2 + 3]] -> s^3 + 2s^2 + 3s + 6, with a spare point
        let rows = vec![
            vec![Poly::from_coeffs(vec![2.0, 1.0]), Poly::one()],
            vec![Poly::zero(), Poly::from_coeffs(vec![3.0, 0.0, 1.0])],
        ];
        let fft = FftPlanner::<f64>::new().plan_fft_forward(5);
        let det = determinant(&rows, None, &unit_circle(5), &*fft).chop(1e-12);
        assert_eq!(det.degree(), Some(3));
        for (k, expected) in [6.0, 3.0, 2.0, 1.0].into_iter().enumerate() {
            assert_relative_eq!(det.coeff(k), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clear_mixed_denominators() {
        // [1/s, 2/(s+1), 3] -> [(s+1), 2s, 3s(s+1)]
        let a = Rational::new(Poly::one(), Poly::s()).unwrap();
        let b = Rational::new(Poly::constant(2.0), Poly::from_coeffs(vec![1.0, 1.0])).unwrap();
        let c = Rational::constant(3.0);
        let cleared = clear_denominators(&[&a, &b, &c]);
        assert_eq!(cleared[0].coeffs(), &[1.0, 1.0]);
        assert_eq!(cleared[1].coeffs(), &[0.0, 2.0]);
        assert_eq!(cleared[2].coeffs(), &[0.0, 3.0, 3.0]);
    }

    #[test]
    fn test_characteristic_frequency() {
        let p = Poly::from_coeffs(vec![1e-3, 1e-6]);
        assert_relative_eq!(characteristic_frequency([&p].into_iter()), 1e3, max_relative = 1e-12);
        let flat = Poly::constant(4.0);
        assert_relative_eq!(characteristic_frequency([&flat].into_iter()), 1.0);
    }

    #[test]
    fn test_resistive_divider() {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 9.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 2.0));
        circuit.register(Resistor::new("R2", [NodeId(2), NodeId(0)], 1.0));
        let x = solve_circuit(&circuit).unwrap();

        // V/s step sources: s·V(s) is the DC value
        assert!(x.node(NodeId(0)).unwrap().is_zero());
        assert_relative_eq!(x.node(NodeId(1)).unwrap().eval(1.0), 9.0, epsilon = 1e-9);
        assert_relative_eq!(x.node(NodeId(2)).unwrap().eval(1.0), 3.0, epsilon = 1e-9);
        // 3 A delivered by the source flows into its positive terminal
        assert_relative_eq!(x.branch(BranchId(0)).unwrap().eval(1.0), -3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rc_node_expression() {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 1.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 1e3));
        circuit.register(Capacitor::new("C1", [NodeId(2), NodeId(0)], 1e-6));
        let x = solve_circuit(&circuit).unwrap();

        // 1 / (s (1 + sRC)) = 1000 / (s (s + 1000))
        let v2 = x.node(NodeId(2)).unwrap();
        assert_eq!(v2.denominator().degree(), Some(2));
        assert_relative_eq!(v2.denominator().leading(), 1.0);
        assert_relative_eq!(v2.numerator().coeff(0), 1000.0, max_relative = 1e-9);
        assert_relative_eq!(v2.denominator().coeff(1), 1000.0, max_relative = 1e-9);
        assert_eq!(v2.denominator().coeff(0), 0.0);
    }

    #[test]
    fn test_floating_node_is_singular() {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 1.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(0)], 1.0));
        assert!(matches!(solve_circuit(&circuit), Err(NodalError::SingularSystem)));
    }

    #[test]
    fn test_parallel_sources_are_singular() {
        let mut circuit = Circuit::new(2);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 5.0));
        circuit.register(VoltageSource::new("V2", [NodeId(1), NodeId(0)], 3.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(0)], 1.0));
        assert!(matches!(solve_circuit(&circuit), Err(NodalError::SingularSystem)));
    }
}
