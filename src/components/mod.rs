//! Component models for circuit analysis.
//!
//! This module provides models for all supported circuit components:
//! - Linear: Resistor, Inductor, Capacitor
//! - Sources: Voltage Source, Current Source
//!
//! The impedance model is a total function over [`Component`]: every kind
//! has an s-domain expression, and unknown type tags are rejected when a
//! netlist is turned into components (see [`ComponentKind::from_tag`]).

mod linear;
mod sources;

pub use linear::{Capacitor, Inductor, Resistor};
pub use sources::{CurrentSource, VoltageSource};

use std::fmt;

use crate::circuit::NodeId;
use crate::error::{NodalError, Result};
use crate::expr::Rational;

/// Kinds of components the solver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Resistor,
    Inductor,
    Capacitor,
    VoltageSource,
    CurrentSource,
}

impl ComponentKind {
    /// Parse a netlist type tag (`R`, `L`, `C`, `V`, `I`, case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "R" => Some(Self::Resistor),
            "L" => Some(Self::Inductor),
            "C" => Some(Self::Capacitor),
            "V" => Some(Self::VoltageSource),
            "I" => Some(Self::CurrentSource),
            _ => None,
        }
    }

    /// Single-letter netlist tag.
    pub fn tag(&self) -> char {
        match self {
            Self::Resistor => 'R',
            Self::Inductor => 'L',
            Self::Capacitor => 'C',
            Self::VoltageSource => 'V',
            Self::CurrentSource => 'I',
        }
    }

    /// Whether this kind is stamped as an admittance.
    pub fn is_passive(&self) -> bool {
        matches!(self, Self::Resistor | Self::Inductor | Self::Capacitor)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resistor => "resistor",
            Self::Inductor => "inductor",
            Self::Capacitor => "capacitor",
            Self::VoltageSource => "voltage source",
            Self::CurrentSource => "current source",
        };
        write!(f, "{}", name)
    }
}

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Inductor(Inductor),
    Capacitor(Capacitor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
}

impl Component {
    /// Create a component of the given kind between `nodes[0]` and `nodes[1]`.
    pub fn new(kind: ComponentKind, name: impl Into<String>, value: f64, nodes: [NodeId; 2]) -> Self {
        match kind {
            ComponentKind::Resistor => Resistor::new(name, nodes, value).into(),
            ComponentKind::Inductor => Inductor::new(name, nodes, value).into(),
            ComponentKind::Capacitor => Capacitor::new(name, nodes, value).into(),
            ComponentKind::VoltageSource => VoltageSource::new(name, nodes, value).into(),
            ComponentKind::CurrentSource => CurrentSource::new(name, nodes, value).into(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Inductor(_) => ComponentKind::Inductor,
            Component::Capacitor(_) => ComponentKind::Capacitor,
            Component::VoltageSource(_) => ComponentKind::VoltageSource,
            Component::CurrentSource(_) => ComponentKind::CurrentSource,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Inductor(l) => &l.name,
            Component::Capacitor(c) => &c.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
        }
    }

    /// Terminal nodes `[a, b]`. For sources, `a` is the positive terminal.
    pub fn nodes(&self) -> [NodeId; 2] {
        match self {
            Component::Resistor(r) => r.nodes,
            Component::Inductor(l) => l.nodes,
            Component::Capacitor(c) => c.nodes,
            Component::VoltageSource(v) => v.nodes,
            Component::CurrentSource(i) => i.nodes,
        }
    }

    /// The component's defining value (ohms, henries, farads, volts, amperes).
    pub fn value(&self) -> f64 {
        match self {
            Component::Resistor(r) => r.resistance,
            Component::Inductor(l) => l.inductance,
            Component::Capacitor(c) => c.capacitance,
            Component::VoltageSource(v) => v.voltage,
            Component::CurrentSource(i) => i.current,
        }
    }

    /// Laplace-domain impedance.
    ///
    /// Sources return their own magnitude; they are never stamped as an
    /// admittance (the System Builder injects them instead).
    pub fn impedance(&self) -> Result<Rational> {
        match self {
            Component::Resistor(r) => Ok(r.impedance()),
            Component::Inductor(l) => Ok(l.impedance()),
            Component::Capacitor(c) => c.impedance(),
            Component::VoltageSource(v) => Ok(Rational::constant(v.voltage)),
            Component::CurrentSource(i) => Ok(Rational::constant(i.current)),
        }
    }

    /// Laplace-domain admittance `1 / Z(s)` of a passive component.
    ///
    /// Fails with [`NodalError::DivisionByZero`] when the impedance is zero
    /// (a 0 Ω resistor or 0 H inductor) or undefined (a 0 F capacitor), and
    /// with [`NodalError::InvalidParameter`] for sources.
    pub fn admittance(&self) -> Result<Rational> {
        if !self.kind().is_passive() {
            return Err(NodalError::InvalidParameter {
                component: self.name().to_string(),
                param: "admittance".to_string(),
                message: format!("a {} has no admittance stamp", self.kind()),
            });
        }
        self.impedance()?
            .recip()
            .ok_or_else(|| NodalError::DivisionByZero {
                component: self.name().to_string(),
            })
    }

    pub fn is_voltage_source(&self) -> bool {
        matches!(self, Component::VoltageSource(_))
    }
}

impl From<Resistor> for Component {
    fn from(r: Resistor) -> Self {
        Component::Resistor(r)
    }
}

impl From<Inductor> for Component {
    fn from(l: Inductor) -> Self {
        Component::Inductor(l)
    }
}

impl From<Capacitor> for Component {
    fn from(c: Capacitor) -> Self {
        Component::Capacitor(c)
    }
}

impl From<VoltageSource> for Component {
    fn from(v: VoltageSource) -> Self {
        Component::VoltageSource(v)
    }
}

impl From<CurrentSource> for Component {
    fn from(i: CurrentSource) -> Self {
        Component::CurrentSource(i)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.nodes();
        write!(f, "{} ({}, {} -> {}, {})", self.name(), self.kind(), a, b, self.value())
    }
}
