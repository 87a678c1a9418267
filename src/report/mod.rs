//! Text and CSV output for the CLI frontend.
//!
//! Everything writes to a caller-supplied [`Write`], so the CLI can target
//! stdout or a file and tests can target a buffer.

use std::io::Write;

use crate::error::{NodalError, Result};
use crate::solver::{AdmittanceSystem, Solution, TimeGrid, Trace};

fn output_error(e: std::io::Error) -> NodalError {
    NodalError::OutputError {
        message: e.to_string(),
    }
}

/// Write the admittance matrix and source vector, one row per line.
pub fn write_system<W: Write>(out: &mut W, system: &AdmittanceSystem) -> Result<()> {
    writeln!(
        out,
        "Admittance system ({} nodes, {} branches):",
        system.num_nodes(),
        system.num_branches()
    )
    .map_err(output_error)?;
    write!(out, "{}", system).map_err(output_error)
}

/// Write the s-domain node voltages.
pub fn write_node_voltages<W: Write>(out: &mut W, solution: &Solution) -> Result<()> {
    writeln!(out, "Node voltages (s-domain):").map_err(output_error)?;
    for (node, voltage) in solution.circuit().nodes().zip(solution.node_voltages()) {
        writeln!(out, "  V({}) = {}", node, voltage).map_err(output_error)?;
    }
    Ok(())
}

/// Write each trace's expression, waveform and sampling outcome.
pub fn write_traces<W: Write>(out: &mut W, traces: &[Trace]) -> Result<()> {
    for trace in traces {
        writeln!(out, "{}:", trace.label).map_err(output_error)?;
        writeln!(out, "  s-domain: {}", trace.expression).map_err(output_error)?;
        writeln!(out, "  t-domain: {}", trace.waveform).map_err(output_error)?;
        if let Some(v) = trace.waveform.final_value() {
            writeln!(out, "  final:    {:.6}", v).map_err(output_error)?;
        }
        match &trace.samples {
            Ok(samples) if samples.is_complete() => {}
            Ok(samples) => {
                writeln!(out, "  samples:  {} of {} skipped", samples.failed.len(), samples.len())
                    .map_err(output_error)?;
            }
            Err(e) => writeln!(out, "  samples:  {}", e).map_err(output_error)?,
        }
    }
    Ok(())
}

/// Write sampled traces as CSV: a `t` column, then one column per trace.
///
/// Failed samples, and every sample of a trace whose sampling failed, are
/// written as empty cells.
pub fn write_csv<W: Write>(out: &mut W, grid: &TimeGrid, traces: &[Trace]) -> Result<()> {
    let header: Vec<&str> = std::iter::once("t")
        .chain(traces.iter().map(|t| t.label.as_str()))
        .collect();
    writeln!(out, "{}", header.join(",")).map_err(output_error)?;

    for (i, t) in grid.times().enumerate() {
        let mut row = vec![format!("{:e}", t)];
        for trace in traces {
            let cell = trace
                .samples
                .as_ref()
                .ok()
                .and_then(|s| s.values.get(i))
                .filter(|v| v.is_finite())
                .map(|v| format!("{:e}", v))
                .unwrap_or_default();
            row.push(cell);
        }
        writeln!(out, "{}", row.join(",")).map_err(output_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, NodeId};
    use crate::components::{Resistor, VoltageSource};
    use crate::solver::{Analysis, SampleConfig};

    fn divider() -> Solution {
        let mut circuit = Circuit::new(3);
        circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 2.0));
        circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 1.0));
        circuit.register(Resistor::new("R2", [NodeId(2), NodeId(0)], 1.0));
        Analysis::new(circuit).run().unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let solution = divider();
        let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
        let traces = solution
            .traces(&solution.node_quantities(), &SampleConfig::new(grid.clone()))
            .unwrap();

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &grid, &traces).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "t,V(N1),V(N2)");
        assert!(lines[1].starts_with("0e0,"));
    }

    #[test]
    fn test_text_report() {
        let solution = divider();
        let mut buffer = Vec::new();
        write_system(&mut buffer, solution.system()).unwrap();
        write_node_voltages(&mut buffer, &solution).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("3 nodes, 1 branches"));
        assert!(text.contains("V(GND) = 0"));
        assert!(text.contains("V(N2) = "));
    }
}
