//! Circuit validation.

use crate::error::{NodalError, Result};

use super::Circuit;

/// Validate the preconditions of a solve.
///
/// Checks:
/// - The circuit declares at least one node (ground)
/// - At least one voltage source is present
/// - Every component value is a finite number
///
/// Node ranges and zero-valued passives are reported by the System Builder,
/// which is where they would otherwise corrupt the matrix.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    if circuit.num_nodes() == 0 {
        return Err(NodalError::topology(
            "circuit needs at least one node (ground)",
        ));
    }

    if !circuit.has_voltage_source() {
        return Err(NodalError::MissingSource);
    }

    for component in circuit.all() {
        if !component.value().is_finite() {
            return Err(NodalError::InvalidParameter {
                component: component.name().to_string(),
                param: "value".to_string(),
                message: format!("{} is not a finite number", component.value()),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeId;
    use crate::components::{Resistor, VoltageSource};

    #[test]
    fn test_missing_source() {
        let mut circuit = Circuit::new(2);
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(0)], 1.0));
        assert!(matches!(validate_circuit(&circuit), Err(NodalError::MissingSource)));
    }

    #[test]
    fn test_zero_nodes() {
        let circuit = Circuit::new(0);
        assert!(matches!(
            validate_circuit(&circuit),
            Err(NodalError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_non_finite_value() {
        let mut circuit = Circuit::new(2);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 1.0));
        circuit.register(Resistor::new("R2", [NodeId(1), NodeId(0)], f64::NAN));
        assert!(matches!(
            validate_circuit(&circuit),
            Err(NodalError::InvalidParameter { component, .. }) if component == "R2"
        ));
    }

    #[test]
    fn test_valid_circuit() {
        let mut circuit = Circuit::new(2);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 1.0));
        circuit.register(Resistor::new("R2", [NodeId(1), NodeId(0)], 1.0));
        assert!(validate_circuit(&circuit).is_ok());
    }
}
