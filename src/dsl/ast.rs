//! Abstract Syntax Tree types for the grid text format.

use std::collections::HashMap;

use crate::circuit::Position;

/// Complete AST representation of a parsed grid file.
#[derive(Debug, Clone, Default)]
pub struct GridAst {
    /// Node declarations in file order
    pub nodes: Vec<NodeDef>,
    /// Wire declarations in file order
    pub wires: Vec<WireDef>,
    /// Configuration overrides from `.param` lines
    pub params: Vec<ParamDef>,
}

impl GridAst {
    /// Create a new empty grid AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A node declaration.
#[derive(Debug, Clone)]
pub struct NodeDef {
    /// Node type keyword
    pub node_type: NodeType,
    /// Unique node name
    pub name: String,
    /// Ohms, farads or ratio, depending on the type
    pub value: Option<f64>,
    /// Transistor state from an `on`/`off` word
    pub switch_on: Option<bool>,
    /// `key=value` attributes (`x`, `y`)
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

impl NodeDef {
    /// Canvas position from the `x=`/`y=` attributes, defaulting to the origin.
    pub fn position(&self) -> Position {
        Position::new(
            self.params.get("x").copied().unwrap_or(0.0),
            self.params.get("y").copied().unwrap_or(0.0),
        )
    }
}

/// Node types supported by the grid format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The generator
    Source,
    /// House load
    House,
    /// LED street light load
    Led,
    /// Inline resistor
    Resistor,
    /// Transistor switch
    Transistor,
    /// Capacitor to ground
    Capacitor,
    /// Voltage-ratio transformer
    Transformer,
}

impl NodeType {
    /// Parse a node type from its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "SRC" | "SOURCE" | "GEN" => Some(Self::Source),
            "HOUSE" => Some(Self::House),
            "LED" => Some(Self::Led),
            "RES" | "RESISTOR" => Some(Self::Resistor),
            "TRANS" | "TRANSISTOR" => Some(Self::Transistor),
            "CAP" | "CAPACITOR" => Some(Self::Capacitor),
            "XFMR" | "XFR" | "TRANSFORMER" => Some(Self::Transformer),
            _ => None,
        }
    }

    /// Whether a declaration of this type carries a numeric value.
    pub fn takes_value(&self) -> bool {
        matches!(self, Self::Resistor | Self::Capacitor | Self::Transformer)
    }
}

/// A wire declaration.
#[derive(Debug, Clone)]
pub struct WireDef {
    pub a: String,
    pub b: String,
    pub line: usize,
}

/// A configuration override.
#[derive(Debug, Clone)]
pub struct ParamDef {
    pub name: String,
    pub value: f64,
    pub line: usize,
}
