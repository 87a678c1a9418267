//! Real polynomials in `s`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use super::format_number;

/// A real polynomial `c0 + c1·s + c2·s² + ...`.
///
/// Coefficients are stored in ascending order. Trailing (highest order)
/// exact zeros are never stored, so the zero polynomial has no coefficients.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Poly {
    coeffs: Vec<f64>,
}

impl Poly {
    /// Build a polynomial from ascending coefficients.
    pub fn from_coeffs(mut coeffs: Vec<f64>) -> Self {
        while coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant polynomial 1.
    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// A constant polynomial.
    pub fn constant(c: f64) -> Self {
        Self::from_coeffs(vec![c])
    }

    /// The polynomial `s`.
    pub fn s() -> Self {
        Self::monomial(1.0, 1)
    }

    /// The monomial `c·s^k`.
    pub fn monomial(c: f64, k: usize) -> Self {
        let mut coeffs = vec![0.0; k + 1];
        coeffs[k] = c;
        Self::from_coeffs(coeffs)
    }

    /// Expand `gain · Π (s - r)` over the given roots.
    ///
    /// Complex roots must appear in conjugate pairs for the result to be
    /// real; the imaginary residue of the expansion is discarded.
    pub fn from_roots(gain: f64, roots: &[Complex64]) -> Self {
        let mut acc = vec![Complex64::new(1.0, 0.0)];
        for &r in roots {
            let mut next = vec![Complex64::new(0.0, 0.0); acc.len() + 1];
            for (k, &c) in acc.iter().enumerate() {
                next[k + 1] += c;
                next[k] -= c * r;
            }
            acc = next;
        }
        Self::from_coeffs(acc.into_iter().map(|c| c.re * gain).collect())
    }

    /// Ascending coefficients.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Coefficient of `s^k` (zero beyond the degree).
    pub fn coeff(&self, k: usize) -> f64 {
        self.coeffs.get(k).copied().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// Highest-order coefficient (0 for the zero polynomial).
    pub fn leading(&self) -> f64 {
        self.coeffs.last().copied().unwrap_or(0.0)
    }

    /// Largest coefficient magnitude.
    pub fn max_abs(&self) -> f64 {
        self.coeffs.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    /// Sum of coefficient magnitudes (bounds |p(s)| on the unit circle).
    pub fn abs_sum(&self) -> f64 {
        self.coeffs.iter().map(|c| c.abs()).sum()
    }

    /// Number of exactly-zero low-order coefficients, i.e. the multiplicity
    /// of the root at `s = 0` when it is structural.
    pub fn low_order_zeros(&self) -> usize {
        self.coeffs.iter().take_while(|&&c| c == 0.0).count()
    }

    /// If the polynomial is a single term `c·s^k`, return `(c, k)`.
    pub fn as_monomial(&self) -> Option<(f64, usize)> {
        let k = self.low_order_zeros();
        (self.degree() == Some(k)).then(|| (self.coeffs[k], k))
    }

    /// Evaluate at a real point (Horner).
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Evaluate at a complex point (Horner).
    pub fn eval_complex(&self, z: Complex64) -> Complex64 {
        self.coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    /// First derivative.
    pub fn derivative(&self) -> Poly {
        Self::from_coeffs(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, &c)| c * k as f64)
                .collect(),
        )
    }

    /// Multiply every coefficient by `k`.
    pub fn scale(&self, k: f64) -> Poly {
        Self::from_coeffs(self.coeffs.iter().map(|c| c * k).collect())
    }

    /// Multiply by `s^k`.
    pub fn shift_up(&self, k: usize) -> Poly {
        if self.is_zero() {
            return Poly::zero();
        }
        let mut coeffs = vec![0.0; k];
        coeffs.extend_from_slice(&self.coeffs);
        Self { coeffs }
    }

    /// Divide by `s^k`, dropping the `k` lowest coefficients.
    ///
    /// Only exact when those coefficients are zero.
    pub fn shift_down(&self, k: usize) -> Poly {
        Self::from_coeffs(self.coeffs.iter().skip(k).copied().collect())
    }

    /// Substitute `s -> alpha·s`.
    pub fn rescale_variable(&self, alpha: f64) -> Poly {
        let mut factor = 1.0;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| {
                let scaled = c * factor;
                factor *= alpha;
                scaled
            })
            .collect();
        Self::from_coeffs(coeffs)
    }

    /// Replace coefficients with magnitude at most `threshold` by exact zeros.
    pub fn chop(&self, threshold: f64) -> Poly {
        Self::from_coeffs(
            self.coeffs
                .iter()
                .map(|&c| if c.abs() <= threshold { 0.0 } else { c })
                .collect(),
        )
    }

    /// If `self == lambda · other` (to relative precision `tol`), return `lambda`.
    pub fn ratio_to(&self, other: &Poly, tol: f64) -> Option<f64> {
        if self.degree() != other.degree() || other.is_zero() {
            return None;
        }
        let lambda = self.leading() / other.leading();
        let scale = self.max_abs();
        self.coeffs
            .iter()
            .zip(&other.coeffs)
            .all(|(a, b)| (a - lambda * b).abs() <= tol * scale)
            .then_some(lambda)
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Poly::from_coeffs((0..len).map(|k| self.coeff(k) + rhs.coeff(k)).collect())
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Poly::from_coeffs((0..len).map(|k| self.coeff(k) - rhs.coeff(k)).collect())
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Poly::from_coeffs(coeffs)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.scale(-1.0)
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(self, rhs: Poly) -> Poly {
        &self + &rhs
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        &self - &rhs
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        &self * &rhs
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}

impl fmt::Display for Poly {
    /// Descending powers, e.g. `2·s^2 + 0.5·s - 1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (k, &c) in self.coeffs.iter().enumerate().rev() {
            if c == 0.0 {
                continue;
            }
            let magnitude = c.abs();
            if first {
                if c < 0.0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {} ", if c < 0.0 { '-' } else { '+' })?;
            }
            first = false;

            let number = format_number(magnitude);
            match (k, number.as_str()) {
                (0, _) => write!(f, "{}", number)?,
                (1, "1") => write!(f, "s")?,
                (1, _) => write!(f, "{}·s", number)?,
                (_, "1") => write!(f, "s^{}", k)?,
                _ => write!(f, "{}·s^{}", number, k)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trailing_zeros_trimmed() {
        let p = Poly::from_coeffs(vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(p.degree(), Some(1));
        assert!(Poly::from_coeffs(vec![0.0, 0.0]).is_zero());
        assert_eq!(Poly::zero().degree(), None);
    }

    #[test]
    fn test_arithmetic() {
        // (s + 1)(s - 1) = s^2 - 1
        let a = Poly::from_coeffs(vec![1.0, 1.0]);
        let b = Poly::from_coeffs(vec![-1.0, 1.0]);
        assert_eq!(&a * &b, Poly::from_coeffs(vec![-1.0, 0.0, 1.0]));
        assert_eq!(&a + &b, Poly::from_coeffs(vec![0.0, 2.0]));
        assert_eq!(&a - &a, Poly::zero());
    }

    #[test]
    fn test_eval_and_derivative() {
        let p = Poly::from_coeffs(vec![3.0, 0.0, 2.0]);
        assert_relative_eq!(p.eval(2.0), 11.0);
        assert_eq!(p.derivative(), Poly::from_coeffs(vec![0.0, 4.0]));
        let z = p.eval_complex(Complex64::new(0.0, 1.0));
        assert_relative_eq!(z.re, 1.0);
        assert_relative_eq!(z.im, 0.0);
    }

    #[test]
    fn test_from_roots_conjugate_pair() {
        // (s - (-1 + 2i))(s - (-1 - 2i)) = s^2 + 2s + 5
        let p = Poly::from_roots(
            2.0,
            &[Complex64::new(-1.0, 2.0), Complex64::new(-1.0, -2.0)],
        );
        assert_relative_eq!(p.coeff(0), 10.0);
        assert_relative_eq!(p.coeff(1), 4.0);
        assert_relative_eq!(p.coeff(2), 2.0);
    }

    #[test]
    fn test_monomial_and_shifts() {
        let p = Poly::monomial(0.5, 2);
        assert_eq!(p.as_monomial(), Some((0.5, 2)));
        assert_eq!(p.low_order_zeros(), 2);
        assert_eq!(p.shift_down(2), Poly::constant(0.5));
        assert_eq!(Poly::constant(0.5).shift_up(2), p);
        assert_eq!(Poly::from_coeffs(vec![1.0, 1.0]).as_monomial(), None);
    }

    #[test]
    fn test_rescale_variable() {
        // p(s) = 1 + s + s^2, p(2s) = 1 + 2s + 4s^2
        let p = Poly::from_coeffs(vec![1.0, 1.0, 1.0]).rescale_variable(2.0);
        assert_eq!(p, Poly::from_coeffs(vec![1.0, 2.0, 4.0]));
    }

    #[test]
    fn test_ratio_to() {
        let a = Poly::from_coeffs(vec![0.0, 2.0]);
        let b = Poly::from_coeffs(vec![0.0, 0.5]);
        assert_relative_eq!(a.ratio_to(&b, 1e-12).unwrap(), 4.0);
        assert!(a.ratio_to(&Poly::from_coeffs(vec![1.0, 0.5]), 1e-12).is_none());
    }

    #[test]
    fn test_display() {
        let p = Poly::from_coeffs(vec![-1.0, 1.0, 2.0]);
        assert_eq!(p.to_string(), "2·s^2 + s - 1");
        assert_eq!(Poly::zero().to_string(), "0");
    }
}
