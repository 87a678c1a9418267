//! # Nodal Core
//!
//! Laplace-domain nodal analysis of linear circuits.
//!
//! This library provides:
//! - A small netlist format for R, L, C, voltage and current sources
//! - Modified Nodal Analysis (MNA) with admittances rational in `s`
//! - Exact node voltages as rational functions of `s`
//! - Inverse Laplace transform into closed-form time-domain waveforms
//! - Sampling over a time grid with an explicit failure policy
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the netlist format
//! - [`circuit`] - Component registry and validation
//! - [`components`] - Component models and their impedances
//! - [`expr`] - Polynomials, rational functions and root finding
//! - [`solver`] - MNA assembly, symbolic solve, inverse transform, sampling
//! - [`report`] - Text and CSV output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! nodal rc.net --t-stop 5 --points 500 --csv rc.csv
//! ```
//!
//! ### Library
//!
//! ```
//! use nodal_core::circuit::{Circuit, NodeId};
//! use nodal_core::components::{Capacitor, Resistor, VoltageSource};
//! use nodal_core::Analysis;
//!
//! let mut circuit = Circuit::new(3);
//! circuit.register(VoltageSource::new("V1", [NodeId(1), NodeId(0)], 5.0));
//! circuit.register(Resistor::new("R1", [NodeId(1), NodeId(2)], 1e3));
//! circuit.register(Capacitor::new("C1", [NodeId(2), NodeId(0)], 1e-3));
//!
//! let solution = Analysis::new(circuit).run()?;
//! let v = solution.node_waveform(NodeId(2))?;
//! assert!((v.evaluate(1.0) - 5.0 * (1.0 - (-1.0f64).exp())).abs() < 1e-9);
//! # Ok::<(), nodal_core::NodalError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuitSolver } from 'nodal_core';
//!
//! const solver = new WasmCircuitSolver(netlist);
//! const samples = solver.sample_node(2, 5.0, 500);
//! ```
//!
//! ## Method
//!
//! 1. Stamp every component's admittance into `Y(s)`, sources as steps `X/s`
//! 2. Solve `Y(s)·x = z(s)` exactly for every node voltage
//! 3. Expand each voltage into partial fractions and invert term by term
//! 4. Evaluate the resulting causal waveform at the requested times

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod expr;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{NodalError, Result};
pub use solver::{Analysis, AnalysisConfig, Solution};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitSolver;

/// Default end of the sampled time window in seconds
pub const DEFAULT_T_STOP: f64 = 5.0;

/// Default number of samples
pub const DEFAULT_POINTS: usize = 500;
