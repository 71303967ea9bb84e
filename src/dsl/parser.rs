//! Parser for the grid text format.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{GridError, Result};

/// Parser for grid text.
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

    /// Parse the entire grid description.
    pub fn parse(&mut self) -> Result<GridAst> {
        let mut ast = GridAst::new();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    if self.current.text.eq_ignore_ascii_case("WIRE") {
                        let wire = self.parse_wire()?;
                        ast.wires.push(wire);
                    } else {
                        let node = self.parse_node()?;
                        ast.nodes.push(node);
                    }
                }
                TokenKind::Number | TokenKind::Equals => {
                    return Err(GridError::parse(
                        self.current.line,
                        format!("unexpected token '{}'", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(GridError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            ))
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(GridError::parse(
                self.current.line,
                format!("unexpected trailing token '{}'", self.current.text),
            )),
        }
    }

    fn expect_value(&mut self) -> Result<f64> {
        let tok = self.expect(TokenKind::Number, "a number")?;
        parse_value(&tok.text)
            .ok_or_else(|| GridError::parse(tok.line, format!("invalid number '{}'", tok.text)))
    }

    fn parse_directive(&mut self, ast: &mut GridAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_ascii_lowercase().as_str() {
            ".param" => {
                if self.at_line_end() {
                    return Err(GridError::parse(line, ".param needs at least one key=value"));
                }
                while !self.at_line_end() {
                    let name = self.expect(TokenKind::Identifier, "a parameter name")?.text;
                    self.expect(TokenKind::Equals, "'='")?;
                    let value = self.expect_value()?;
                    ast.params.push(ParamDef {
                        name: name.to_ascii_lowercase(),
                        value,
                        line,
                    });
                }
                Ok(())
            }
            _ => Err(GridError::parse(
                line,
                format!("unknown directive: {}", directive),
            )),
        }
    }

    fn parse_wire(&mut self) -> Result<WireDef> {
        let line = self.current.line;
        self.advance()?; // WIRE
        let a = self.expect(TokenKind::Identifier, "a node name")?.text;
        let b = self.expect(TokenKind::Identifier, "a node name")?.text;
        Ok(WireDef { a, b, line })
    }

    fn parse_node(&mut self) -> Result<NodeDef> {
        let keyword = self.current.text.clone();
        let line = self.current.line;
        let node_type = NodeType::from_keyword(&keyword).ok_or_else(|| {
            GridError::UnknownNodeKind {
                kind: keyword.clone(),
                line,
            }
        })?;
        self.advance()?;

        let name = self.expect(TokenKind::Identifier, "a node name")?.text;
        let mut value = None;
        let mut switch_on = None;
        let mut params = HashMap::new();

        while !self.at_line_end() {
            match self.current.kind {
                TokenKind::Number => {
                    if !node_type.takes_value() {
                        return Err(GridError::parse(
                            line,
                            format!("{} '{}' takes no value", keyword, name),
                        ));
                    }
                    if value.is_some() {
                        return Err(GridError::parse(
                            line,
                            format!("'{}' has more than one value", name),
                        ));
                    }
                    value = Some(self.expect_value()?);
                }
                TokenKind::Identifier => {
                    let word = self.current.text.clone();
                    self.advance()?;

                    if self.current.kind == TokenKind::Equals {
                        self.advance()?;
                        let v = self.expect_value()?;
                        params.insert(word.to_ascii_lowercase(), v);
                        continue;
                    }

                    let state = match word.to_ascii_lowercase().as_str() {
                        "on" | "closed" => Some(true),
                        "off" | "open" => Some(false),
                        _ => None,
                    };
                    match state {
                        Some(on) if node_type == NodeType::Transistor => switch_on = Some(on),
                        _ => {
                            return Err(GridError::parse(
                                line,
                                format!("unexpected word '{}' in {} '{}'", word, keyword, name),
                            ));
                        }
                    }
                }
                _ => {
                    return Err(GridError::parse(
                        line,
                        format!("unexpected token '{}'", self.current.text),
                    ));
                }
            }
        }

        Ok(NodeDef {
            node_type,
            name,
            value,
            switch_on,
            params,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<GridAst> {
        super::super::parse(input)
    }

    #[test]
    fn test_parse_nodes() {
        let ast = parse("SRC GEN\nRES R1 2.5 x=10 y=-4\nTRANS T1 off\nCAP C1 220u\n").unwrap();
        assert_eq!(ast.nodes.len(), 4);

        let r1 = &ast.nodes[1];
        assert_eq!(r1.node_type, NodeType::Resistor);
        assert_eq!(r1.name, "R1");
        assert_eq!(r1.value, Some(2.5));
        assert_eq!(r1.params["x"], 10.0);
        assert_eq!(r1.params["y"], -4.0);

        assert_eq!(ast.nodes[2].switch_on, Some(false));
        assert!((ast.nodes[3].value.unwrap() - 220e-6).abs() < 1e-15);
    }

    #[test]
    fn test_parse_wires_and_params() {
        let ast = parse(".param v=24 r_wire=0.1\nSRC GEN\nHOUSE H1\nwire GEN H1").unwrap();
        assert_eq!(ast.params.len(), 2);
        assert_eq!(ast.params[0].name, "v");
        assert_eq!(ast.params[1].value, 0.1);
        assert_eq!(ast.wires.len(), 1);
        assert_eq!((ast.wires[0].a.as_str(), ast.wires[0].b.as_str()), ("GEN", "H1"));
    }

    #[test]
    fn test_parse_with_comments() {
        let ast = parse("# town\nHOUSE H1 ; the first house\n\n").unwrap();
        assert_eq!(ast.nodes.len(), 1);
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            parse("DIODE D1"),
            Err(GridError::UnknownNodeKind { line: 1, .. })
        ));
    }

    #[test]
    fn test_value_on_load_is_error() {
        assert!(matches!(
            parse("HOUSE H1 5"),
            Err(GridError::ParseError { .. })
        ));
    }

    #[test]
    fn test_wire_needs_two_names() {
        assert!(parse("WIRE GEN").is_err());
        assert!(parse("WIRE GEN H1 H2").is_err());
    }

    #[test]
    fn test_on_word_only_for_transistors() {
        assert!(parse("HOUSE H1 on").is_err());
        assert!(parse("TRANS T1 closed").is_ok());
    }
}
