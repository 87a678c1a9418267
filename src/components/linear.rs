//! Linear passive components: Resistor, Inductor, Capacitor.
//!
//! Each passive element maps to its Laplace-domain impedance:
//!
//! | Element | Z(s) |
//! |---------|------|
//! | R | `R` |
//! | L | `s·L` |
//! | C | `1 / (s·C)` |

use crate::circuit::NodeId;
use crate::error::{NodalError, Result};
use crate::expr::{Poly, Rational};

/// A resistor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub name: String,
    pub nodes: [NodeId; 2],
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], resistance: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            resistance,
        }
    }

    /// Impedance `R`, independent of `s`.
    pub fn impedance(&self) -> Rational {
        Rational::constant(self.resistance)
    }
}

/// An inductor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    pub name: String,
    pub nodes: [NodeId; 2],
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], inductance: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            inductance,
        }
    }

    /// Impedance `s·L`.
    pub fn impedance(&self) -> Rational {
        Rational::from_poly(Poly::monomial(self.inductance, 1))
    }
}

/// A capacitor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub name: String,
    pub nodes: [NodeId; 2],
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], capacitance: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            capacitance,
        }
    }

    /// Impedance `1 / (s·C)`.
    ///
    /// A zero capacitance has no defined impedance.
    pub fn impedance(&self) -> Result<Rational> {
        Rational::new(Poly::one(), Poly::monomial(self.capacitance, 1)).ok_or_else(|| {
            NodalError::DivisionByZero {
                component: self.name.clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resistor_impedance() {
        let r = Resistor::new("R1", [NodeId(1), NodeId(0)], 1000.0);
        assert_relative_eq!(r.impedance().eval(0.0), 1000.0);
        assert_relative_eq!(r.impedance().eval(1e6), 1000.0);
    }

    #[test]
    fn test_inductor_impedance() {
        let l = Inductor::new("L1", [NodeId(1), NodeId(2)], 0.5);
        assert_relative_eq!(l.impedance().eval(4.0), 2.0);
        assert_eq!(l.impedance().numerator().degree(), Some(1));
    }

    #[test]
    fn test_capacitor_impedance() {
        let c = Capacitor::new("C1", [NodeId(1), NodeId(0)], 0.25);
        assert_relative_eq!(c.impedance().unwrap().eval(2.0), 2.0);
    }

    #[test]
    fn test_zero_capacitor_fails() {
        let c = Capacitor::new("C1", [NodeId(1), NodeId(0)], 0.0);
        assert!(matches!(
            c.impedance(),
            Err(NodalError::DivisionByZero { component }) if component == "C1"
        ));
    }
}
