//! Laplace-domain MNA solver.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations `Y(s)·x = z(s)` where:
//! - x contains node voltages and branch currents
//! - Y is the admittance/coefficient matrix, rational in `s`
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G(s)  B ] [ v ]   [ i(s) ]
//! [ C     0 ] [ j ] = [ e(s) ]
//! ```
//!
//! where:
//! - G is the admittance matrix (node equations)
//! - B, C connect voltage sources to nodes
//! - v is the vector of node voltages, ground included
//! - j is the vector of voltage source currents
//! - i is the sum of current sources into each node
//! - e is the vector of voltage source values
//!
//! Sources switch on at `t = 0`, so every source term is a step `X/s`.
//!
//! ## Pipeline
//!
//! 1. [`MnaBuilder`] stamps every component into an [`AdmittanceSystem`]
//! 2. [`linear::solve`] returns each unknown as a reduced [`Rational`](crate::expr::Rational)
//! 3. [`to_time_domain`] expands it into exponential modes ([`TimeWaveform`])
//! 4. [`sample`] evaluates the waveform on a [`TimeGrid`]

mod analysis;
pub mod laplace;
pub mod linear;
mod mna;
mod sampler;
mod waveform;

pub use analysis::{Analysis, AnalysisConfig, Quantity, Solution, Trace};
pub use laplace::to_time_domain;
pub use linear::NodeVoltages;
pub use mna::{AdmittanceSystem, MnaBuilder, SystemBuilder};
pub use sampler::{sample, SampleConfig, SamplePolicy, Samples, TimeGrid};
pub use waveform::{PoleTerm, TimeWaveform};

/// Conductance pinned on the ground row so the system stays non-singular.
pub const GROUND_CONDUCTANCE: f64 = 1e-6;

/// Relative threshold below which determinant coefficients vanish.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Relative distance at which a zero and a pole cancel.
pub const ROOT_TOLERANCE: f64 = 1e-6;

/// Relative distance at which poles count as one repeated pole.
pub const POLE_CLUSTER_TOLERANCE: f64 = 1e-5;
