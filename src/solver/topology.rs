//! Per-tick graph construction and reachability.

use tracing::trace;

use crate::circuit::{Grid, NodeId};
use crate::config::GridConfig;

/// One directed half of a wire in the adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    pub resistance: f64,
}

impl Edge {
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

/// Symmetric adjacency list indexed by `NodeId`.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<Vec<Edge>>,
}

impl Adjacency {
    /// Build the conducting graph for the current switch states.
    ///
    /// A wire touching a switched-off transistor contributes no edge. Every
    /// other wire gets the base wire resistance plus each endpoint's series
    /// contribution, so the value is the same in both directions.
    pub fn build(grid: &Grid, config: &GridConfig) -> Self {
        let mut edges = vec![Vec::new(); grid.num_nodes()];

        for wire in grid.wires() {
            let Some(resistance) = edge_resistance(grid, config, wire.a, wire.b) else {
                continue;
            };
            trace!(a = %wire.a, b = %wire.b, resistance, "edge");
            edges[wire.a.0].push(Edge {
                to: wire.b,
                resistance,
            });
            edges[wire.b.0].push(Edge {
                to: wire.a,
                resistance,
            });
        }

        Self { edges }
    }

    /// Edges leaving `node`.
    pub fn neighbors(&self, node: NodeId) -> &[Edge] {
        self.edges.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first search from `start`, returning a per-node membership mask.
    pub fn reachable_from(&self, start: NodeId) -> Vec<bool> {
        let mut seen = vec![false; self.edges.len()];
        if start.0 >= seen.len() {
            return seen;
        }

        let mut stack = vec![start];
        seen[start.0] = true;
        while let Some(u) = stack.pop() {
            for edge in &self.edges[u.0] {
                if !seen[edge.to.0] {
                    seen[edge.to.0] = true;
                    stack.push(edge.to);
                }
            }
        }
        seen
    }
}

/// Resistance of the wire between `a` and `b`.
///
/// Returns `None` if either endpoint is missing or is an open switch. A
/// resistor endpoint adds its full ohms to every wire it touches, so a
/// resistor wired in series between two other nodes is counted twice.
pub fn edge_resistance(grid: &Grid, config: &GridConfig, a: NodeId, b: NodeId) -> Option<f64> {
    let na = grid.node(a)?;
    let nb = grid.node(b)?;
    let ra = na.kind.series_resistance(config)?;
    let rb = nb.kind.series_resistance(config)?;
    Some(config.wire_resistance + ra + rb)
}
