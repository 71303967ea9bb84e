//! Core types for grid representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A handle to a node in the grid arena.
/// Node 0 is always the source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The source node (always index 0).
    pub const SOURCE: NodeId = NodeId(0);

    /// Check if this is the source node.
    pub fn is_source(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_source() {
            write!(f, "SRC")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// Unordered pair of wire endpoints, stored as `(min, max)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WireKey(NodeId, NodeId);

impl WireKey {
    /// Build the key for the pair `{a, b}` in either order.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The smaller endpoint.
    pub fn low(&self) -> NodeId {
        self.0
    }

    /// The larger endpoint.
    pub fn high(&self) -> NodeId {
        self.1
    }
}

impl fmt::Display for WireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.0, self.1)
    }
}

/// An undirected wire between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub a: NodeId,
    pub b: NodeId,
}

impl Wire {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self { a, b }
    }

    pub fn key(&self) -> WireKey {
        WireKey::new(self.a, self.b)
    }
}

/// Canvas position. Display only, never read by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_key_is_unordered() {
        let k1 = WireKey::new(NodeId(3), NodeId(1));
        let k2 = WireKey::new(NodeId(1), NodeId(3));
        assert_eq!(k1, k2);
        assert_eq!(k1.low(), NodeId(1));
        assert_eq!(k1.high(), NodeId(3));
        assert_eq!(k1.to_string(), "N1|N3");
    }

    #[test]
    fn test_source_display() {
        assert_eq!(NodeId::SOURCE.to_string(), "SRC");
        assert!(NodeId(0).is_source());
        assert!(!NodeId(2).is_source());
    }
}
