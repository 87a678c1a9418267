//! Polynomial root finding.
//!
//! Roots are the eigenvalues of the companion matrix of the monic,
//! frequency-scaled polynomial, followed by a few guarded Newton steps on
//! the original polynomial.

use nalgebra::DMatrix;
use num_complex::Complex64;

use super::Poly;

/// Newton refinement steps applied to every eigenvalue estimate.
const POLISH_STEPS: usize = 3;

/// Find all complex roots of `p`, with multiplicity.
///
/// Structural zero roots (exactly-zero low-order coefficients) are returned
/// as exact zeros. Complex roots are returned in conjugate pairs. The zero
/// polynomial and nonzero constants have no roots.
pub fn find_roots(p: &Poly) -> Vec<Complex64> {
    let zero_roots = p.low_order_zeros();
    let q = p.shift_down(zero_roots);
    let mut roots = vec![Complex64::new(0.0, 0.0); zero_roots];

    let n = match q.degree() {
        Some(n) if n > 0 => n,
        _ => return roots,
    };

    if n == 1 {
        roots.push(Complex64::new(-q.coeff(0) / q.coeff(1), 0.0));
        return roots;
    }

    // Balance root magnitudes around 1: the product of the roots is
    // |q0 / qn|, so its n-th root is their geometric mean.
    let mut omega = (q.coeff(0) / q.leading()).abs().powf(1.0 / n as f64);
    if !omega.is_finite() || omega == 0.0 {
        omega = 1.0;
    }
    let monic = q.rescale_variable(omega).scale(1.0 / (q.leading() * omega.powi(n as i32)));

    let mut companion = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        companion[(i, n - 1)] = -monic.coeff(i);
    }

    let derivative = q.derivative();
    for eig in companion.complex_eigenvalues().iter() {
        let estimate = Complex64::new(eig.re * omega, eig.im * omega);
        if estimate.im < 0.0 {
            // Mirrored from the partner with positive imaginary part.
            continue;
        }
        let root = polish(&q, &derivative, estimate);
        if root.im == 0.0 {
            roots.push(root);
        } else {
            roots.push(root);
            roots.push(root.conj());
        }
    }

    roots
}

/// Guarded Newton refinement: a step is kept only if it reduces |p(r)|.
fn polish(p: &Poly, dp: &Poly, mut r: Complex64) -> Complex64 {
    let mut residual = p.eval_complex(r).norm();
    for _ in 0..POLISH_STEPS {
        let slope = dp.eval_complex(r);
        if residual == 0.0 || slope.norm() == 0.0 {
            break;
        }
        let candidate = r - p.eval_complex(r) / slope;
        let candidate_residual = p.eval_complex(candidate).norm();
        if !(candidate_residual < residual) {
            break;
        }
        r = candidate;
        residual = candidate_residual;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sorted_by_re(mut roots: Vec<Complex64>) -> Vec<Complex64> {
        roots.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        roots
    }

    #[test]
    fn test_linear_root() {
        let roots = find_roots(&Poly::from_coeffs(vec![4.0, 2.0]));
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0].re, -2.0);
    }

    #[test]
    fn test_structural_zero_roots() {
        // s^2 (s + 3)
        let roots = sorted_by_re(find_roots(&Poly::from_coeffs(vec![0.0, 0.0, 3.0, 1.0])));
        assert_eq!(roots.len(), 3);
        assert_relative_eq!(roots[0].re, -3.0, epsilon = 1e-12);
        assert_eq!(roots[1], Complex64::new(0.0, 0.0));
        assert_eq!(roots[2], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_real_roots_widely_spread() {
        // (s + 1)(s + 1000)
        let roots = sorted_by_re(find_roots(&Poly::from_coeffs(vec![1000.0, 1001.0, 1.0])));
        assert_relative_eq!(roots[0].re, -1000.0, max_relative = 1e-10);
        assert_relative_eq!(roots[1].re, -1.0, max_relative = 1e-10);
    }

    #[test]
    fn test_conjugate_pair() {
        // s^2 + 2s + 5 -> -1 ± 2i
        let roots = find_roots(&Poly::from_coeffs(vec![5.0, 2.0, 1.0]));
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0], roots[1].conj());
        assert_relative_eq!(roots[0].re, -1.0, epsilon = 1e-10);
        assert_relative_eq!(roots[0].im.abs(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_constants_have_no_roots() {
        assert!(find_roots(&Poly::constant(3.0)).is_empty());
        assert!(find_roots(&Poly::zero()).is_empty());
    }
}
