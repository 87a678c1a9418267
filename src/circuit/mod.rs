//! Circuit representation and validation.
//!
//! This module provides the component registry. The [`Circuit`] struct
//! owns the components of one solve session, in registration order, along
//! with the node count and the branch variables introduced by voltage
//! sources.

mod graph;
mod types;
mod validate;

pub use graph::Circuit;
pub use types::*;
pub use validate::validate_circuit;
