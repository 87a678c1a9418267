//! Abstract Syntax Tree types for the netlist format.

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetlistAst {
    /// All component lines, in file order
    pub components: Vec<ComponentDef>,
    /// Node count from `.nodes`, ground included
    pub node_count: Option<usize>,
    /// Sample grid from `.tran`
    pub tran: Option<TranDef>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component line: `TYPE VALUE NODE1 NODE2`.
///
/// The type tag is kept as written; it is resolved to a component kind when
/// the circuit is built, so unknown tags can be skipped with a diagnostic
/// instead of failing the whole parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    /// Type tag (R, L, C, V, I)
    pub tag: String,
    /// Component value (resistance, inductance, ...)
    pub value: f64,
    /// Terminal node indices `[a, b]`
    pub nodes: [usize; 2],
    /// Source line number for error reporting
    pub line: usize,
}

/// Time grid requested by `.tran T_STOP [POINTS]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranDef {
    /// End of the sampled window (the window starts at 0)
    pub t_stop: f64,
    /// Number of sample points
    pub points: usize,
}
