//! WASM bindings for Nodal Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitSolver } from 'nodal_core';
//!
//! await init();
//!
//! const netlist = `
//!   V 5  1 0
//!   R 1k 1 2
//!   C 1m 2 0
//! `;
//!
//! const solver = new WasmCircuitSolver(netlist);
//! console.log(solver.time_domain(2));
//! const samples = solver.sample_node(2, 5.0, 500);
//! if (!samples.is_complete) {
//!   console.warn('skipped samples', samples.failed);
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{Circuit, NodeId};
use crate::dsl;
use crate::error::NodalError;
use crate::solver::{sample, Analysis, SamplePolicy, Samples, Solution, TimeGrid};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: NodalError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A solved circuit, queried from JavaScript.
#[wasm_bindgen]
pub struct WasmCircuitSolver {
    solution: Solution,
}

#[wasm_bindgen]
impl WasmCircuitSolver {
    /// Parse and solve a netlist.
    ///
    /// # Returns
    /// A solver instance or an error if the netlist is invalid or the
    /// circuit cannot be solved.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmCircuitSolver, JsValue> {
        let ast = dsl::parse(netlist).map_err(js_error)?;
        let circuit = Circuit::from_netlist(&ast).map_err(js_error)?;
        let solution = Analysis::new(circuit).run().map_err(js_error)?;
        Ok(WasmCircuitSolver { solution })
    }

    /// Number of nodes, ground included.
    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.solution.circuit().num_nodes()
    }

    /// Node voltage as a rational function of `s`.
    #[wasm_bindgen]
    pub fn s_domain(&self, node: usize) -> Result<String, JsValue> {
        self.solution
            .node_voltage(NodeId(node))
            .map(|v| v.to_string())
            .map_err(js_error)
    }

    /// Node voltage as a closed-form function of `t`.
    #[wasm_bindgen]
    pub fn time_domain(&self, node: usize) -> Result<String, JsValue> {
        self.solution
            .node_waveform(NodeId(node))
            .map(|w| w.to_string())
            .map_err(js_error)
    }

    /// Sample a node voltage on `points` times from 0 to `t_stop`.
    ///
    /// Samples that cannot be evaluated are skipped and listed in
    /// `failed`; their slots in `values` hold `NaN`. A grid on which no
    /// sample can be evaluated is an error.
    #[wasm_bindgen]
    pub fn sample_node(&self, node: usize, t_stop: f64, points: usize) -> Result<WasmSamples, JsValue> {
        sample_node(&self.solution, node, t_stop, points)
            .map(WasmSamples::from)
            .map_err(js_error)
    }
}

fn sample_node(solution: &Solution, node: usize, t_stop: f64, points: usize) -> crate::Result<Samples> {
    let waveform = solution.node_waveform(NodeId(node))?;
    let grid = TimeGrid::linspace(0.0, t_stop, points)?;
    sample(&waveform, &grid, SamplePolicy::skip_all())
}

/// Sampled node voltage handed to JavaScript.
#[wasm_bindgen]
pub struct WasmSamples {
    times: Vec<f64>,
    values: Vec<f64>,
    failed: Vec<u32>,
}

impl From<Samples> for WasmSamples {
    fn from(samples: Samples) -> Self {
        Self {
            failed: samples.failed.iter().map(|&i| i as u32).collect(),
            times: samples.times,
            values: samples.values,
        }
    }
}

#[wasm_bindgen]
impl WasmSamples {
    #[wasm_bindgen(getter)]
    pub fn times(&self) -> Vec<f64> {
        self.times.clone()
    }

    /// Sampled values, `NaN` at every index listed in `failed`.
    #[wasm_bindgen(getter)]
    pub fn values(&self) -> Vec<f64> {
        self.values.clone()
    }

    /// Indices of the samples that could not be evaluated.
    #[wasm_bindgen(getter)]
    pub fn failed(&self) -> Vec<u32> {
        self.failed.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved(netlist: &str) -> Solution {
        let ast = dsl::parse(netlist).unwrap();
        Analysis::new(Circuit::from_netlist(&ast).unwrap()).run().unwrap()
    }

    #[test]
    fn test_failed_samples_are_listed() {
        // Negative resistor: e^(1000 t) overflows past t ~ 0.71
        let solution = solved("V 1 1 0\nR -1 1 2\nC 1m 2 0\n");
        let samples = WasmSamples::from(sample_node(&solution, 2, 1.0, 11).unwrap());
        assert!(!samples.is_complete());
        assert_eq!(samples.failed(), vec![8, 9, 10]);
        for (i, v) in samples.values().iter().enumerate() {
            assert_eq!(v.is_nan(), samples.failed().contains(&(i as u32)));
        }
    }

    #[test]
    fn test_complete_samples() {
        let solution = solved("V 5 1 0\nR 1k 1 2\nC 1m 2 0\n");
        let samples = WasmSamples::from(sample_node(&solution, 2, 5.0, 51).unwrap());
        assert!(samples.is_complete());
        assert_eq!(samples.values().len(), 51);
        assert_eq!(samples.times()[50], 5.0);
    }
}
