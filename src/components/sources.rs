//! Independent voltage and current sources.
//!
//! Sources switch on at t = 0, so a source of value `X` appears in the
//! Laplace domain as the step `X / s`.

use crate::circuit::NodeId;
use crate::expr::{Poly, Rational};

/// A voltage source component.
///
/// Voltage sources require an extra row/column in the MNA matrix for the
/// branch current. The source enforces: V+ - V- = V_source
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    pub voltage: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], voltage: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            voltage,
        }
    }

    /// The applied voltage as a Laplace-domain step, `V / s`.
    pub fn step(&self) -> Rational {
        step(self.voltage)
    }
}

/// A current source component.
///
/// Current sources add directly to the RHS vector of the MNA equations.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSource {
    pub name: String,
    pub nodes: [NodeId; 2], // current is driven out of nodes[0] into the circuit
    pub current: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(name: impl Into<String>, nodes: [NodeId; 2], current: f64) -> Self {
        Self {
            name: name.into(),
            nodes,
            current,
        }
    }

    /// The driven current as a Laplace-domain step, `I / s`.
    pub fn step(&self) -> Rational {
        step(self.current)
    }
}

fn step(value: f64) -> Rational {
    Rational::new(Poly::constant(value), Poly::s()).unwrap_or_else(Rational::zero)
}
