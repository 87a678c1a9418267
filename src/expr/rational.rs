//! Rational functions of `s`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use super::{find_roots, Poly};

/// Relative precision used when deciding two denominators are proportional.
const PROPORTIONAL_TOLERANCE: f64 = 1e-12;

/// A rational function `num(s) / den(s)`.
///
/// The denominator is never the zero polynomial. Arithmetic does not
/// simplify; call [`Rational::simplified`] to cancel common factors and
/// bring the expression to canonical form (monic denominator).
#[derive(Debug, Clone, PartialEq)]
pub struct Rational {
    num: Poly,
    den: Poly,
}

impl Rational {
    /// Build `num / den`, or `None` if `den` is the zero polynomial.
    pub fn new(num: Poly, den: Poly) -> Option<Self> {
        (!den.is_zero()).then_some(Self { num, den })
    }

    /// A polynomial viewed as a rational function.
    pub fn from_poly(num: Poly) -> Self {
        Self {
            num,
            den: Poly::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_poly(Poly::zero())
    }

    pub fn constant(c: f64) -> Self {
        Self::from_poly(Poly::constant(c))
    }

    /// The complex frequency variable `s`.
    pub fn s() -> Self {
        Self::from_poly(Poly::s())
    }

    pub fn numerator(&self) -> &Poly {
        &self.num
    }

    pub fn denominator(&self) -> &Poly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// `1 / self`, or `None` if `self` is zero.
    pub fn recip(&self) -> Option<Self> {
        Self::new(self.den.clone(), self.num.clone())
    }

    /// `self / rhs`, or `None` if `rhs` is zero.
    pub fn checked_div(&self, rhs: &Rational) -> Option<Self> {
        rhs.recip().map(|r| self * &r)
    }

    /// Multiply by a real constant.
    pub fn scale(&self, k: f64) -> Self {
        Self {
            num: self.num.scale(k),
            den: self.den.clone(),
        }
    }

    /// Substitute `s -> alpha·s`.
    pub fn rescale_variable(&self, alpha: f64) -> Self {
        Self {
            num: self.num.rescale_variable(alpha),
            den: self.den.rescale_variable(alpha),
        }
    }

    pub fn eval(&self, s: f64) -> f64 {
        self.num.eval(s) / self.den.eval(s)
    }

    pub fn eval_complex(&self, s: Complex64) -> Complex64 {
        self.num.eval_complex(s) / self.den.eval_complex(s)
    }

    /// True when the numerator degree is below the denominator degree, i.e.
    /// the inverse transform has no impulse at the origin.
    pub fn is_proper(&self) -> bool {
        match (self.num.degree(), self.den.degree()) {
            (None, _) => true,
            (Some(n), Some(d)) => n < d,
            (Some(_), None) => false,
        }
    }

    /// Ratio of leading coefficients.
    pub fn gain(&self) -> f64 {
        self.num.leading() / self.den.leading()
    }

    /// Roots of the numerator.
    pub fn zeros(&self) -> Vec<Complex64> {
        find_roots(&self.num)
    }

    /// Roots of the denominator.
    pub fn poles(&self) -> Vec<Complex64> {
        find_roots(&self.den)
    }

    /// Reduce to lowest terms.
    ///
    /// Structural factors of `s` are cancelled exactly. Remaining zeros and
    /// poles closer than `tol` (relative to their magnitude) cancel pairwise.
    /// The result has a monic denominator rebuilt from the surviving poles.
    pub fn simplified(&self, tol: f64) -> Rational {
        if self.num.is_zero() {
            return Rational::zero();
        }

        let common = self.num.low_order_zeros().min(self.den.low_order_zeros());
        let num = self.num.shift_down(common);
        let den = self.den.shift_down(common);

        let mut zeros = find_roots(&num);
        let mut poles = find_roots(&den);

        let mut i = 0;
        while i < zeros.len() {
            let z = zeros[i];
            let matched = poles
                .iter()
                .position(|&p| (z - p).norm() <= tol * z.norm().max(p.norm()));
            match matched {
                Some(j) => {
                    zeros.swap_remove(i);
                    poles.swap_remove(j);
                }
                None => i += 1,
            }
        }

        let gain = num.leading() / den.leading();
        Rational {
            num: Poly::from_roots(gain, &sort_roots(zeros)),
            den: Poly::from_roots(1.0, &sort_roots(poles)),
        }
    }

    /// Divide numerator and denominator by the leading denominator
    /// coefficient.
    pub fn normalized(&self) -> Rational {
        let lead = self.den.leading();
        Rational {
            num: self.num.scale(1.0 / lead),
            den: self.den.scale(1.0 / lead),
        }
    }
}

/// Order roots so conjugates sit next to each other; keeps the expansion in
/// [`Poly::from_roots`] deterministic.
fn sort_roots(mut roots: Vec<Complex64>) -> Vec<Complex64> {
    roots.sort_by(|a, b| {
        a.re.total_cmp(&b.re)
            .then(a.im.abs().total_cmp(&b.im.abs()))
            .then(a.im.total_cmp(&b.im))
    });
    roots
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        if self.is_zero() {
            return rhs.clone();
        }
        if rhs.is_zero() {
            return self.clone();
        }
        // Shared denominator up to a constant: a/d + c/(λd) = (a + c/λ)/d
        if let Some(lambda) = rhs.den.ratio_to(&self.den, PROPORTIONAL_TOLERANCE) {
            return Rational {
                num: &self.num + &rhs.num.scale(1.0 / lambda),
                den: self.den.clone(),
            };
        }
        Rational {
            num: &(&self.num * &rhs.den) + &(&rhs.num * &self.den),
            den: &self.den * &rhs.den,
        }
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        self + &(-rhs)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        if self.is_zero() || rhs.is_zero() {
            return Rational::zero();
        }
        Rational {
            num: &self.num * &rhs.num,
            den: &self.den * &rhs.den,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        self.scale(-1.0)
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        -&self
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((c, 0)) = self.den.as_monomial() {
            return write!(f, "{}", self.num.scale(1.0 / c));
        }
        write!(f, "({}) / ({})", self.num, self.den)
    }
}
