//! Error types for the grid simulator.
//!
//! This module provides a unified error type [`GridError`] covering grid text
//! parsing, placement validation, configuration loading and CLI output.
//!
//! The per-tick solve itself never fails: degenerate networks fall back to a
//! de-energized state instead of returning an error.

use thiserror::Error;

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;

/// Unified error type for all grid operations.
#[derive(Error, Debug)]
pub enum GridError {
    // ============ Grid Text Parsing Errors ============
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

    /// Unknown node kind keyword
    #[error("Unknown node kind '{kind}' at line {line}")]
    UnknownNodeKind { kind: String, line: usize },

    // ============ Placement Errors ============
    /// Invalid parameter value (non-positive, non-finite or unparsable)
    #[error("Invalid parameter '{param}' for '{node}': {message}")]
    InvalidParameter {
        node: String,
        param: String,
        message: String,
    },

    /// Node not found in grid
    #[error("Node '{node}' not found in grid")]
    NodeNotFound { node: String },

    /// Duplicate node name
    #[error("Duplicate node name '{name}'")]
    DuplicateNode { name: String },

    /// The unordered pair is already wired
    #[error("Nodes '{a}' and '{b}' are already connected")]
    DuplicateWire { a: String, b: String },

    /// Wire from a node to itself
    #[error("Cannot wire node '{node}' to itself")]
    SelfLoop { node: String },

    /// No source declared
    #[error("Grid has no source node (declare one with 'SRC <name>')")]
    MissingSource,

    /// More than one source declared
    #[error("Grid already has a source node '{existing}', cannot add '{name}'")]
    DuplicateSource { existing: String, name: String },

    /// Operation needs a transistor
    #[error("Node '{node}' is not a transistor")]
    NotATransistor { node: String },

    // ============ Configuration Errors ============
    /// Configuration value out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file could not be decoded
    #[error("Failed to parse configuration: {source}")]
    ConfigParseError {
        #[source]
        source: serde_json::Error,
    },

    // ============ I/O Errors ============
    /// Error reading a grid or config file
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl GridError {
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

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        node: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            node: node.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(source: serde_json::Error) -> Self {
        Self::ConfigParseError { source }
    }
}
