//! MNA admittance system assembly.

use std::fmt;

use crate::circuit::{Circuit, NodeId};
use crate::components::Component;
use crate::error::{NodalError, Result};
use crate::expr::Rational;

use super::GROUND_CONDUCTANCE;

/// Laplace-domain MNA system `Y(s)·x = z(s)`.
///
/// Unknowns are every node voltage (ground included, at index 0) followed
/// by one branch current per voltage source. Stamps never touch the ground
/// row or column; instead the ground diagonal is pinned to a small
/// conductance so the system stays square and non-singular.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittanceSystem {
    /// Matrix entries (row-major)
    matrix: Vec<Rational>,
    /// Source vector z
    sources: Vec<Rational>,
    /// Matrix dimension
    size: usize,
    /// Number of node voltage unknowns (ground included)
    num_nodes: usize,
}

impl AdmittanceSystem {
    /// Create a zero system for `num_nodes` nodes and `num_branches`
    /// voltage-source branches.
    pub fn new(num_nodes: usize, num_branches: usize) -> Self {
        let size = num_nodes + num_branches;
        Self {
            matrix: vec![Rational::zero(); size * size],
            sources: vec![Rational::zero(); size],
            size,
            num_nodes,
        }
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_branches(&self) -> usize {
        self.size - self.num_nodes
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> &Rational {
        &self.matrix[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: Rational) {
        self.matrix[row * self.size + col] = value;
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: &Rational) {
        let entry = &mut self.matrix[row * self.size + col];
        *entry = &*entry + value;
    }

    /// Source vector element.
    pub fn source(&self, row: usize) -> &Rational {
        &self.sources[row]
    }

    pub fn sources(&self) -> &[Rational] {
        &self.sources
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: &Rational) {
        let entry = &mut self.sources[row];
        *entry = &*entry + value;
    }

    /// Stamp an admittance between two nodes (`None` = ground).
    ///   Y[a,a] += y
    ///   Y[b,b] += y
    ///   Y[a,b] -= y
    ///   Y[b,a] -= y
    pub fn stamp_admittance(&mut self, a: Option<usize>, b: Option<usize>, y: &Rational) {
        if let Some(i) = a {
            self.add(i, i, y);
        }
        if let Some(j) = b {
            self.add(j, j, y);
        }
        if let (Some(i), Some(j)) = (a, b) {
            let neg = -y;
            self.add(i, j, &neg);
            self.add(j, i, &neg);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at
    /// index `br`: V[n+] - V[n-] = E.
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        value: &Rational,
    ) {
        let one = Rational::constant(1.0);
        let minus_one = Rational::constant(-1.0);
        if let Some(i) = n_pos {
            self.add(br, i, &one);
            self.add(i, br, &one);
        }
        if let Some(j) = n_neg {
            self.add(br, j, &minus_one);
            self.add(j, br, &minus_one);
        }
        self.add_source(br, value);
    }

    /// Stamp a current source driving `value` into `n_pos` and drawing it
    /// back from `n_neg`.
    pub fn stamp_current_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        value: &Rational,
    ) {
        if let Some(i) = n_pos {
            self.add_source(i, value);
        }
        if let Some(j) = n_neg {
            self.add_source(j, &-value);
        }
    }

    /// Pin the ground diagonal to a fixed conductance.
    pub fn pin_ground(&mut self, conductance: f64) {
        self.set(0, 0, Rational::constant(conductance));
    }
}

impl fmt::Display for AdmittanceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            write!(f, "[")?;
            for col in 0..self.size {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.get(row, col))?;
            }
            writeln!(f, "] | {}", self.source(row))?;
        }
        Ok(())
    }
}

/// Assembles the admittance system of a circuit.
///
/// This is the seam between the component registry and the linear solver;
/// the analysis driver only talks to it through this trait.
pub trait SystemBuilder {
    /// Build `Y(s)` and `z(s)` for every component of the circuit.
    fn build(&self, circuit: &Circuit) -> Result<AdmittanceSystem>;
}

/// Modified Nodal Analysis builder.
#[derive(Debug, Clone)]
pub struct MnaBuilder {
    /// Conductance pinned on the ground diagonal
    pub ground_conductance: f64,
}

impl Default for MnaBuilder {
    fn default() -> Self {
        Self {
            ground_conductance: GROUND_CONDUCTANCE,
        }
    }
}

impl MnaBuilder {
    pub fn new(ground_conductance: f64) -> Self {
        Self { ground_conductance }
    }
}

impl SystemBuilder for MnaBuilder {
    fn build(&self, circuit: &Circuit) -> Result<AdmittanceSystem> {
        let num_nodes = circuit.num_nodes();
        if num_nodes == 0 {
            return Err(NodalError::topology("circuit needs at least one node (ground)"));
        }

        let mut system = AdmittanceSystem::new(num_nodes, circuit.num_branches());

        for (id, component) in circuit.iter() {
            let [a, b] = component.nodes();
            let n1 = stamp_index(circuit, component, a)?;
            let n2 = stamp_index(circuit, component, b)?;

            match component {
                Component::Resistor(_) | Component::Inductor(_) | Component::Capacitor(_) => {
                    let y = component.admittance()?;
                    system.stamp_admittance(n1, n2, &y);
                }

                Component::VoltageSource(v) => {
                    let branch = circuit.branch_of(id).ok_or_else(|| {
                        NodalError::topology(format!("voltage source {} has no branch", v.name))
                    })?;
                    system.stamp_voltage_source(n1, n2, circuit.branch_index(branch), &v.step());
                }

                Component::CurrentSource(i) => {
                    system.stamp_current_source(n1, n2, &i.step());
                }
            }
        }

        system.pin_ground(self.ground_conductance);

        tracing::debug!(
            size = system.size(),
            nodes = num_nodes,
            branches = system.num_branches(),
            "assembled admittance system"
        );

        Ok(system)
    }
}

/// Matrix row of a terminal, `None` for ground; out-of-range nodes fail.
fn stamp_index(circuit: &Circuit, component: &Component, node: NodeId) -> Result<Option<usize>> {
    if node.0 >= circuit.num_nodes() {
        return Err(NodalError::topology(format!(
            "{} references node {} but the circuit has nodes 0..{}",
            component.name(),
            node.0,
            circuit.num_nodes() - 1
        )));
    }
    Ok((!node.is_ground()).then(|| circuit.node_index(node)))
}
