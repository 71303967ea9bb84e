//! Text format for describing a town grid.
//!
//! A line-oriented format in the spirit of a SPICE netlist. Each line declares
//! one node, one wire, or a set of configuration overrides.
//!
//! # Grammar Overview
//!
//! ```text
//! grid      = { line }
//! line      = comment | directive | node | wire | empty
//! comment   = ('#' | ';') { any_char }
//! directive = ".param" { name '=' number }
//! node      = kind name [number] [state] { attr '=' number }
//! wire      = "WIRE" name name
//!
//! kind      = "SRC" | "HOUSE" | "LED" | "RES" | "TRANS" | "CAP" | "XFMR"
//! state     = "on" | "off" | "closed" | "open"        (TRANS only)
//! number    = ['-'|'+'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+] [suffix]
//! suffix    = 'p' | 'n' | 'u' | 'µ' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! # Node Kinds
//!
//! | Kind | Description | Value |
//! |------|-------------|-------|
//! | SRC | Generator (exactly one) | none |
//! | HOUSE | House load | none |
//! | LED | LED street light | none |
//! | RES | Inline resistor | ohms |
//! | TRANS | Transistor switch | none, optional `on`/`off` |
//! | CAP | Capacitor to ground | nominal farads |
//! | XFMR | Transformer | ratio of the source voltage |
//!
//! # Example
//!
//! ```text
//! # Street with a dimmable lamp
//! .param v=12
//!
//! SRC   GEN  x=140 y=285
//! TRANS T1   on
//! RES   R1   2
//! LED   L1
//! WIRE  GEN T1
//! WIRE  T1  R1
//! WIRE  R1  L1
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse grid text into an AST.
pub fn parse(input: &str) -> Result<GridAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a grid file.
pub fn parse_file(path: &std::path::Path) -> Result<GridAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::GridError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
