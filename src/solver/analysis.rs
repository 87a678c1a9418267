//! Analysis driver: circuit in, rational node voltages and waveforms out.

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::circuit::{validate_circuit, Circuit, ComponentId, NodeId};
use crate::components::Component;
use crate::error::{NodalError, Result};
use crate::expr::Rational;

use super::laplace::to_time_domain;
use super::linear::{self, NodeVoltages};
use super::mna::{AdmittanceSystem, MnaBuilder, SystemBuilder};
use super::sampler::{sample, SampleConfig, Samples};
use super::waveform::TimeWaveform;
use super::{GROUND_CONDUCTANCE, POLE_CLUSTER_TOLERANCE, ROOT_TOLERANCE, SINGULAR_TOLERANCE};

/// Configuration for an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Conductance pinned on the ground row.
    pub ground_conductance: f64,
    /// Determinant coefficients below this fraction of Hadamard's bound
    /// count as zero.
    pub singular_tolerance: f64,
    /// Relative distance at which a zero cancels a pole.
    pub root_tolerance: f64,
    /// Relative distance at which poles merge into a repeated pole.
    pub cluster_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ground_conductance: GROUND_CONDUCTANCE,
            singular_tolerance: SINGULAR_TOLERANCE,
            root_tolerance: ROOT_TOLERANCE,
            cluster_tolerance: POLE_CLUSTER_TOLERANCE,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ground_conductance(mut self, conductance: f64) -> Self {
        self.ground_conductance = conductance;
        self
    }

    /// Set the relative singularity threshold.
    ///
    /// Raising it rejects nearly singular circuits (huge value spreads)
    /// that would otherwise produce poorly conditioned expressions.
    pub fn with_singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    pub fn with_root_tolerance(mut self, tolerance: f64) -> Self {
        self.root_tolerance = tolerance;
        self
    }

    pub fn with_cluster_tolerance(mut self, tolerance: f64) -> Self {
        self.cluster_tolerance = tolerance;
        self
    }
}

/// Runs the pipeline on one circuit.
///
/// The circuit is validated before the system builder sees it, so a
/// circuit without a voltage source never reaches assembly.
pub struct Analysis<B: SystemBuilder = MnaBuilder> {
    circuit: Circuit,
    builder: B,
    config: AnalysisConfig,
}

impl Analysis<MnaBuilder> {
    /// Create an analysis with the default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, AnalysisConfig::default())
    }

    /// Create an analysis with a custom configuration.
    pub fn with_config(circuit: Circuit, config: AnalysisConfig) -> Self {
        let builder = MnaBuilder::new(config.ground_conductance);
        Self::with_builder(circuit, builder, config)
    }
}

impl<B: SystemBuilder> Analysis<B> {
    /// Create an analysis that assembles its system with `builder`.
    pub fn with_builder(circuit: Circuit, builder: B, config: AnalysisConfig) -> Self {
        Self {
            circuit,
            builder,
            config,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate the circuit and assemble its admittance system.
    pub fn build_system(&self) -> Result<AdmittanceSystem> {
        validate_circuit(&self.circuit)?;
        self.builder.build(&self.circuit)
    }

    /// Solve for every node voltage.
    pub fn run(&self) -> Result<Solution> {
        let system = self.build_system()?;
        let unknowns = linear::solve(&system, &self.config)?;

        tracing::info!(
            nodes = self.circuit.num_nodes(),
            components = self.circuit.count(),
            "solved circuit"
        );

        Ok(Solution {
            circuit: self.circuit.clone(),
            system,
            unknowns,
            config: self.config.clone(),
        })
    }
}

/// A quantity that can be read off a solved circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Voltage of a node relative to ground
    NodeVoltage(NodeId),
    /// Voltage across a component, terminal a minus terminal b
    ComponentVoltage(ComponentId),
    /// Current through a component
    ComponentCurrent(ComponentId),
}

/// A sampled quantity.
#[derive(Debug)]
pub struct Trace {
    pub quantity: Quantity,
    /// Printable name, e.g. `V(N2)` or `I(R1)`
    pub label: String,
    pub expression: Rational,
    pub waveform: TimeWaveform,
    /// Sampling outcome; a failing trace does not affect the others
    pub samples: Result<Samples>,
}

/// Result of a successful analysis.
#[derive(Debug, Clone)]
pub struct Solution {
    circuit: Circuit,
    system: AdmittanceSystem,
    unknowns: NodeVoltages,
    config: AnalysisConfig,
}

impl Solution {
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The assembled admittance system.
    pub fn system(&self) -> &AdmittanceSystem {
        &self.system
    }

    /// Node voltages in the s-domain, ground first.
    pub fn node_voltages(&self) -> &[Rational] {
        self.unknowns.voltages()
    }

    pub fn node_voltage(&self, node: NodeId) -> Result<&Rational> {
        self.unknowns.node(node).ok_or(NodalError::NodeNotFound {
            node: node.0,
            node_count: self.circuit.num_nodes(),
        })
    }

    /// Inverse transform of a node voltage.
    pub fn node_waveform(&self, node: NodeId) -> Result<TimeWaveform> {
        Ok(self.waveform(self.node_voltage(node)?))
    }

    /// Voltage across a component, `V(a) - V(b)`.
    pub fn component_voltage(&self, id: ComponentId) -> Result<Rational> {
        let [a, b] = self.circuit.get(id)?.nodes();
        let difference = self.node_voltage(a)? - self.node_voltage(b)?;
        Ok(difference.simplified(self.config.root_tolerance))
    }

    /// Current through a component.
    ///
    /// Passive elements report the current flowing from terminal a to
    /// terminal b. Sources report the current they deliver out of terminal
    /// a into the circuit.
    pub fn component_current(&self, id: ComponentId) -> Result<Rational> {
        let component = self.circuit.get(id)?;
        let current = match component {
            Component::VoltageSource(_) => {
                let branch = self.circuit.branch_of(id).ok_or(NodalError::ComponentNotFound { index: id.0 })?;
                let j = self.unknowns.branch(branch).ok_or(NodalError::ComponentNotFound { index: id.0 })?;
                -j
            }
            Component::CurrentSource(i) => i.step(),
            _ => &component.admittance()? * &self.component_voltage(id)?,
        };
        Ok(current.simplified(self.config.root_tolerance))
    }

    /// The s-domain expression of a quantity.
    pub fn expression(&self, quantity: Quantity) -> Result<Rational> {
        match quantity {
            Quantity::NodeVoltage(node) => self.node_voltage(node).cloned(),
            Quantity::ComponentVoltage(id) => self.component_voltage(id),
            Quantity::ComponentCurrent(id) => self.component_current(id),
        }
    }

    /// Printable name of a quantity.
    pub fn label(&self, quantity: Quantity) -> Result<String> {
        Ok(match quantity {
            Quantity::NodeVoltage(node) => format!("V({})", node),
            Quantity::ComponentVoltage(id) => format!("V({})", self.circuit.get(id)?.name()),
            Quantity::ComponentCurrent(id) => format!("I({})", self.circuit.get(id)?.name()),
        })
    }

    /// Inverse Laplace transform with this analysis' tolerances.
    pub fn waveform(&self, expression: &Rational) -> TimeWaveform {
        to_time_domain(expression, self.config.cluster_tolerance)
    }

    /// Voltage of every non-ground node.
    pub fn node_quantities(&self) -> Vec<Quantity> {
        self.circuit
            .nodes()
            .filter(|n| !n.is_ground())
            .map(Quantity::NodeVoltage)
            .collect()
    }

    /// Voltage across and current through every component, in
    /// registration order.
    pub fn component_quantities(&self) -> Vec<Quantity> {
        self.circuit
            .iter()
            .flat_map(|(id, _)| [Quantity::ComponentVoltage(id), Quantity::ComponentCurrent(id)])
            .collect()
    }

    /// Transform and sample one quantity.
    pub fn trace(&self, quantity: Quantity, sampling: &SampleConfig) -> Result<Trace> {
        let label = self.label(quantity)?;
        let expression = self.expression(quantity)?;
        let waveform = self.waveform(&expression);
        let samples = sample(&waveform, &sampling.grid, sampling.policy);
        if let Err(e) = &samples {
            tracing::warn!(trace = %label, "{}", e);
        }
        Ok(Trace {
            quantity,
            label,
            expression,
            waveform,
            samples,
        })
    }

    /// Transform and sample several quantities.
    ///
    /// Unknown nodes or components fail the call; sampling failures are
    /// kept per trace.
    pub fn traces(&self, quantities: &[Quantity], sampling: &SampleConfig) -> Result<Vec<Trace>> {
        #[cfg(feature = "parallel")]
        let traces = quantities
            .par_iter()
            .map(|&q| self.trace(q, sampling))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let traces = quantities
            .iter()
            .map(|&q| self.trace(q, sampling))
            .collect();

        traces
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::NodeVoltage(node) => write!(f, "V({})", node),
            Quantity::ComponentVoltage(id) => write!(f, "V({})", id),
            Quantity::ComponentCurrent(id) => write!(f, "I({})", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Capacitor, CurrentSource, Resistor, VoltageSource};
    use crate::solver::{SamplePolicy, TimeGrid};
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn rc_circuit() -> Circuit {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 5.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 1e3));
        circuit.register(Capacitor::new("C1", [NodeId(2), NodeId(0)], 1e-3));
        circuit
    }

    /// Records whether assembly was attempted.
    struct CountingBuilder {
        calls: Cell<usize>,
    }

    impl SystemBuilder for CountingBuilder {
        fn build(&self, circuit: &Circuit) -> Result<AdmittanceSystem> {
            self.calls.set(self.calls.get() + 1);
            MnaBuilder::default().build(circuit)
        }
    }

    #[test]
    fn test_rc_charging() {
        let solution = Analysis::new(rc_circuit()).run().unwrap();
        let w = solution.node_waveform(NodeId(2)).unwrap();
        for &t in &[0.0, 0.5, 1.0, 3.0] {
            assert_relative_eq!(w.evaluate(t), 5.0 * (1.0 - (-t).exp()), epsilon = 1e-9);
        }
        assert_relative_eq!(w.final_value().unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_source_skips_builder() {
        let mut circuit = Circuit::new(2);
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(0)], 1.0));
        let builder = CountingBuilder { calls: Cell::new(0) };
        let analysis = Analysis::with_builder(circuit, builder, AnalysisConfig::default());
        assert!(matches!(analysis.run(), Err(NodalError::MissingSource)));
        assert_eq!(analysis.builder.calls.get(), 0);

        let analysis = Analysis::with_builder(
            rc_circuit(),
            CountingBuilder { calls: Cell::new(0) },
            AnalysisConfig::default(),
        );
        analysis.run().unwrap();
        assert_eq!(analysis.builder.calls.get(), 1);
    }

    #[test]
    fn test_component_quantities() {
        let solution = Analysis::new(rc_circuit()).run().unwrap();
        let r1 = ComponentId(1);

        // Initial current V/R, decaying with tau = 1 s
        let i = solution.waveform(&solution.component_current(r1).unwrap());
        assert_relative_eq!(i.evaluate(0.0), 5e-3, epsilon = 1e-12);
        assert_relative_eq!(i.evaluate(1.0), 5e-3 * (-1.0_f64).exp(), epsilon = 1e-12);

        // The source delivers the same current
        let source = solution.waveform(&solution.component_current(ComponentId(0)).unwrap());
        assert_relative_eq!(source.evaluate(1.0), i.evaluate(1.0), epsilon = 1e-12);

        let v = solution.waveform(&solution.component_voltage(r1).unwrap());
        assert_relative_eq!(v.evaluate(1.0), 5.0 * (-1.0_f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_current_source_into_resistor() {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(2), NodeId(0)], 1.0));
        circuit.register(Resistor::new("R1", [NodeId(2), NodeId(0)], 1.0));
        circuit.register(CurrentSource::new("I1", [NodeId(1), NodeId(0)], 2.0));
        circuit.register(Resistor::new("R2", [NodeId(1), NodeId(0)], 3.0));
        let solution = Analysis::new(circuit).run().unwrap();

        let w = solution.node_waveform(NodeId(1)).unwrap();
        assert_relative_eq!(w.evaluate(0.5), 6.0, epsilon = 1e-9);
        let i = solution.waveform(&solution.component_current(ComponentId(2)).unwrap());
        assert_relative_eq!(i.evaluate(0.5), 2.0);
    }

    #[test]
    fn test_unknown_node() {
        let solution = Analysis::new(rc_circuit()).run().unwrap();
        assert!(matches!(
            solution.node_voltage(NodeId(9)),
            Err(NodalError::NodeNotFound { node: 9, node_count: 3 })
        ));
        assert!(solution.component_current(ComponentId(7)).is_err());
    }

    #[test]
    fn test_traces() {
        let solution = Analysis::new(rc_circuit()).run().unwrap();
        let sampling = SampleConfig::new(TimeGrid::linspace(0.0, 2.0, 21).unwrap())
            .with_policy(SamplePolicy::AbortOnFirst);

        let traces = solution.traces(&solution.node_quantities(), &sampling).unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].label, "V(N1)");
        assert_eq!(traces[1].label, "V(N2)");
        let samples = traces[1].samples.as_ref().unwrap();
        assert_eq!(samples.len(), 21);
        assert_relative_eq!(samples.values[20], 5.0 * (1.0 - (-2.0_f64).exp()), epsilon = 1e-9);

        let labels: Vec<_> = solution
            .component_quantities()
            .into_iter()
            .map(|q| solution.label(q).unwrap())
            .collect();
        assert_eq!(labels[..2], ["V(V1)".to_string(), "I(V1)".to_string()]);
    }
}
