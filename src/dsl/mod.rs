//! Netlist front end.
//!
//! The netlist mirrors the console input of the solver: one component per
//! line, in the order `TYPE VALUE NODE1 NODE2`, with node 0 as ground.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';' | '*') { any_char }
//! directive   = ".nodes" count | ".tran" value [count] | ".end"
//! component   = type value node node
//!
//! type        = "R" | "L" | "C" | "V" | "I"
//! node        = count | "GND"
//! value       = number [unit_suffix]
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'f' | 'p' | 'n' | 'u' | 'm' | 'k' | "meg" | 'M' | 'G' | 'T'
//! ```
//!
//! # Example
//!
//! ```text
//! # RC charging: C1 charges towards 5 V with tau = 1 s
//! .nodes 3
//! .tran 5 500
//!
//! V  5     1  0
//! R  1k    1  2
//! C  1m    2  0
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::NodalError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
