//! Error types for the Nodal circuit solver.
//!
//! This module provides a unified error type [`NodalError`] that covers
//! all error conditions that can occur during netlist parsing, circuit
//! validation, solving, and waveform sampling.

use thiserror::Error;

/// Result type alias using [`NodalError`].
pub type Result<T> = std::result::Result<T, NodalError>;

/// Unified error type for all Nodal operations.
#[derive(Error, Debug)]
pub enum NodalError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unrecognized component type tag
    #[error("Unsupported component type '{tag}' at line {line}")]
    UnsupportedComponent { tag: String, line: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ Circuit Errors ============
    /// A component references a node outside the declared range, or the
    /// node count itself is unusable
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    /// No voltage source in the circuit
    #[error("Circuit has no voltage source - add one before solving")]
    MissingSource,

    /// Node not found in circuit
    #[error("Node {node} not found in circuit ({node_count} nodes)")]
    NodeNotFound { node: usize, node_count: usize },

    /// Component not found in circuit
    #[error("Component #{index} not found in circuit")]
    ComponentNotFound { index: usize },

    /// Zero-valued passive element (undefined impedance or admittance)
    #[error("Division by zero: component '{component}' has value 0 and no defined admittance")]
    DivisionByZero { component: String },

    // ============ Solve Errors ============
    /// Admittance matrix is not invertible
    #[error(
        "Singular admittance matrix - the circuit might be short-circuited, \
         improperly grounded, or redundantly connected"
    )]
    SingularSystem,

    /// Numerical sampling of a time-domain waveform failed
    #[error("Evaluation failed at t = {time:.6e} ({failures} failing sample(s))")]
    EvaluationFailed { time: f64, failures: usize },

    /// Invalid solver or sampling parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ I/O Errors ============
    /// Error reading netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl NodalError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn simulation_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NodalError::EvaluationFailed {
            time: 2.5,
            failures: 3,
        };
        assert_eq!(
            err.to_string(),
            "Evaluation failed at t = 2.500000e0 (3 failing sample(s))"
        );

        let err = NodalError::topology("node 7 out of range");
        assert_eq!(err.to_string(), "Invalid circuit topology: node 7 out of range");
    }
}
