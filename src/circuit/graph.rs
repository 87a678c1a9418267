//! Circuit graph structure: the component registry.

use super::types::{BranchId, ComponentId, NodeId, VarIndex};
use crate::components::{Component, ComponentKind};
use crate::dsl::NetlistAst;
use crate::error::{NodalError, Result};

/// A circuit ready for analysis.
///
/// Components are stored in registration order, which is preserved and
/// determines reporting order. Node indices are not checked here; the
/// System Builder rejects out-of-range terminals when it stamps them.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// All components in the circuit
    components: Vec<Component>,

    /// Number of nodes (including ground)
    num_nodes: usize,

    /// Voltage sources in registration order; position = branch index
    branches: Vec<ComponentId>,
}

impl Circuit {
    /// Create an empty circuit with `num_nodes` nodes (ground included).
    pub fn new(num_nodes: usize) -> Self {
        Self {
            components: Vec::new(),
            num_nodes,
            branches: Vec::new(),
        }
    }

    /// Build a circuit from a parsed netlist.
    ///
    /// Components are named `<tag><position>` (R1, C2, ...). Lines with an
    /// unknown type tag are logged and skipped. Without a `.nodes`
    /// directive the node count is one past the highest referenced node.
    pub fn from_netlist(ast: &NetlistAst) -> Result<Self> {
        let num_nodes = match ast.node_count {
            Some(n) => n,
            None => ast
                .components
                .iter()
                .flat_map(|c| c.nodes)
                .max()
                .map_or(1, |highest| highest + 1),
        };

        let mut circuit = Circuit::new(num_nodes);
        for def in &ast.components {
            let kind = match ComponentKind::from_tag(&def.tag) {
                Some(kind) => kind,
                None => {
                    let err = NodalError::UnsupportedComponent {
                        tag: def.tag.clone(),
                        line: def.line,
                    };
                    tracing::warn!(line = def.line, tag = %def.tag, "{}; component skipped", err);
                    continue;
                }
            };
            let name = format!("{}{}", kind.tag(), circuit.count() + 1);
            let nodes = [NodeId(def.nodes[0]), NodeId(def.nodes[1])];
            circuit.register(Component::new(kind, name, def.value, nodes));
        }

        Ok(circuit)
    }

    /// Add a component and return its id.
    pub fn register(&mut self, component: impl Into<Component>) -> ComponentId {
        let component = component.into();
        let id = ComponentId(self.components.len());
        if component.is_voltage_source() {
            self.branches.push(id);
        }
        self.components.push(component);
        id
    }

    /// All components in registration order.
    pub fn all(&self) -> &[Component] {
        &self.components
    }

    /// Number of registered components.
    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// Components with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentId(i), c))
    }

    /// Look up a component by id.
    pub fn get(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id.0)
            .ok_or(NodalError::ComponentNotFound { index: id.0 })
    }

    /// Find a component by name.
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
            .map(ComponentId)
    }

    /// Number of nodes (including ground).
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// All node ids, ground first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.num_nodes).map(NodeId)
    }

    /// Number of branch current variables (one per voltage source).
    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    pub fn has_voltage_source(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Get the total size of the MNA solution vector.
    pub fn matrix_size(&self) -> usize {
        self.num_nodes + self.num_branches()
    }

    /// The branch current variable of a voltage source.
    pub fn branch_of(&self, id: ComponentId) -> Option<BranchId> {
        self.branches.iter().position(|&b| b == id).map(BranchId)
    }

    /// Get the matrix index for a node voltage.
    pub fn node_index(&self, node: NodeId) -> usize {
        VarIndex::Voltage(node).to_index(self.num_nodes)
    }

    /// Get the matrix index for a branch current.
    pub fn branch_index(&self, branch: BranchId) -> usize {
        VarIndex::Current(branch).to_index(self.num_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Resistor, VoltageSource};
    use crate::dsl;

    #[test]
    fn test_register_preserves_order() {
        let mut circuit = Circuit::new(3);
        let v = circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 5.0));
        let r = circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 10.0));
        assert_eq!(v, ComponentId(0));
        assert_eq!(r, ComponentId(1));
        assert_eq!(circuit.count(), 2);
        assert_eq!(circuit.all()[1].name(), "R1");
        assert_eq!(circuit.branch_of(v), Some(BranchId(0)));
        assert_eq!(circuit.branch_of(r), None);
        assert_eq!(circuit.matrix_size(), 4);
        assert_eq!(circuit.branch_index(BranchId(0)), 3);
    }

    #[test]
    fn test_register_does_not_validate_nodes() {
        let mut circuit = Circuit::new(2);
        circuit.register(Resistor::new("R1", [NodeId(7), NodeId(0)], 1.0));
        assert_eq!(circuit.count(), 1);
    }

    #[test]
    fn test_from_netlist_names_and_node_count() {
        let ast = dsl::parse("V 5 1 0\nR 4 1 2\nC 0.25 2 0\n").unwrap();
        let circuit = Circuit::from_netlist(&ast).unwrap();
        assert_eq!(circuit.num_nodes(), 3);
        let names: Vec<_> = circuit.all().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["V1", "R2", "C3"]);
        assert_eq!(circuit.find("c3"), Some(ComponentId(2)));
    }

    #[test]
    fn test_from_netlist_skips_unknown_types() {
        let ast = dsl::parse("V 5 1 0\nQ 1 1 0\nR 4 1 0\n").unwrap();
        let circuit = Circuit::from_netlist(&ast).unwrap();
        assert_eq!(circuit.count(), 2);
        assert_eq!(circuit.all()[1].name(), "R2");
    }

    #[test]
    fn test_explicit_node_count() {
        let ast = dsl::parse(".nodes 5\nV 1 1 0\n").unwrap();
        let circuit = Circuit::from_netlist(&ast).unwrap();
        assert_eq!(circuit.num_nodes(), 5);
        assert_eq!(circuit.nodes().count(), 5);
    }
}
