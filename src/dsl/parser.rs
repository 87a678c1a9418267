//! Parser for the netlist format.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{NodalError, Result};

/// Default number of points for a `.tran` directive without a count.
const DEFAULT_TRAN_POINTS: usize = 500;

/// Parser for netlists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {}
                TokenKind::Directive => {
                    if !self.parse_directive(&mut ast)? {
                        break;
                    }
                }
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    ast.components.push(component);
                }
                TokenKind::Number | TokenKind::Eof => {
                    return Err(NodalError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consume the line terminator, rejecting trailing tokens.
    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => {
                self.advance()?;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(NodalError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<Token> {
        if self.current.kind == TokenKind::Number {
            self.advance()
        } else {
            Err(NodalError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text.trim()),
            ))
        }
    }

    fn expect_value(&mut self, what: &str) -> Result<f64> {
        let tok = self.expect_number(what)?;
        parse_value(&tok.text)
            .ok_or_else(|| NodalError::parse(tok.line, format!("invalid number: {}", tok.text)))
    }

    fn expect_count(&mut self, what: &str) -> Result<usize> {
        let tok = self.expect_number(what)?;
        tok.text.parse::<usize>().map_err(|_| {
            NodalError::parse(
                tok.line,
                format!("{} must be a non-negative integer, got {}", what, tok.text),
            )
        })
    }

    fn expect_node(&mut self) -> Result<usize> {
        if self.current.kind == TokenKind::Identifier
            && self.current.text.eq_ignore_ascii_case("gnd")
        {
            self.advance()?;
            return Ok(0);
        }
        self.expect_count("node index")
    }

    /// Returns `false` when the netlist ends (`.end`).
    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<bool> {
        let directive = self.advance()?;
        let line = directive.line;

        match directive.text.to_lowercase().as_str() {
            ".nodes" => {
                let count = self.expect_count("node count")?;
                if count == 0 {
                    return Err(NodalError::parse(line, "node count must include ground"));
                }
                ast.node_count = Some(count);
            }
            ".tran" => {
                let t_stop = self.expect_value("stop time")?;
                let points = if self.current.kind == TokenKind::Number {
                    self.expect_count("point count")?
                } else {
                    DEFAULT_TRAN_POINTS
                };
                ast.tran = Some(TranDef { t_stop, points });
            }
            ".end" => return Ok(false),
            other => {
                return Err(NodalError::parse(
                    line,
                    format!("unknown directive: {}", other),
                ));
            }
        }

        Ok(true)
    }

    /// `TYPE VALUE NODE1 NODE2`
    fn parse_component(&mut self) -> Result<ComponentDef> {
        let tag = self.advance()?;
        let value = self.expect_value("component value")?;
        let a = self.expect_node()?;
        let b = self.expect_node()?;

        Ok(ComponentDef {
            tag: tag.text,
            value,
            nodes: [a, b],
            line: tag.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    #[test]
    fn test_parse_component_lines() {
        let ast = parse("R 4 1 2\nC 0.25 1 0\nV 5 2 GND\n").unwrap();
        assert_eq!(ast.components.len(), 3);
        assert_eq!(ast.components[0].tag, "R");
        assert_eq!(ast.components[0].value, 4.0);
        assert_eq!(ast.components[0].nodes, [1, 2]);
        assert_eq!(ast.components[2].nodes, [2, 0]);
        assert_eq!(ast.components[2].line, 3);
    }

    #[test]
    fn test_parse_directives() {
        let ast = parse(".nodes 4\n.tran 2.5 200\nR 1k 1 0\n.end\nR 1 2 0\n").unwrap();
        assert_eq!(ast.node_count, Some(4));
        assert_eq!(ast.tran, Some(TranDef { t_stop: 2.5, points: 200 }));
        assert_eq!(ast.components.len(), 1);
    }

    #[test]
    fn test_tran_default_points() {
        let ast = parse(".tran 5").unwrap();
        assert_eq!(ast.tran.unwrap().points, 500);
    }

    #[test]
    fn test_unknown_tag_is_kept_for_the_builder() {
        let ast = parse("Q 1 1 0").unwrap();
        assert_eq!(ast.components[0].tag, "Q");
    }

    #[test]
    fn test_missing_node_is_error() {
        let err = parse("R 4 1\n").unwrap_err();
        assert!(matches!(err, NodalError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_fractional_node_is_error() {
        assert!(parse("R 4 1.5 0").is_err());
        assert!(parse("R 4 -1 0").is_err());
    }

    #[test]
    fn test_trailing_token_is_error() {
        assert!(parse("R 4 1 0 7").is_err());
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input = "# RC charging\n\nV 5 1 0 ; source\n\nR 1 1 2\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.components.len(), 2);
    }
}
