//! Source substitution: splitting reachable nodes into fixed and unknown.

use crate::circuit::{Grid, NodeId};
use crate::components::NodeKind;
use crate::config::GridConfig;

/// Classification of every node for one solve.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Fixed voltage per node (`Some` for the source and reachable transformers)
    fixed: Vec<Option<f64>>,
    /// Matrix row per node (`Some` for reachable non-fixed nodes)
    index: Vec<Option<usize>>,
    /// Unknown nodes in row order
    unknowns: Vec<NodeId>,
}

impl Partition {
    /// Pin the source and every reachable transformer, and number the rest of
    /// the reachable nodes in insertion order.
    ///
    /// Transformers are pinned at `ratio * V_src` using the primary source
    /// voltage, whatever sits between them and the generator.
    pub fn new(grid: &Grid, config: &GridConfig, reachable: &[bool]) -> Self {
        let n = grid.num_nodes();
        let mut fixed = vec![None; n];
        let mut index = vec![None; n];
        let mut unknowns = Vec::new();

        for node in grid.nodes() {
            let i = node.id.0;
            if !reachable.get(i).copied().unwrap_or(false) {
                continue;
            }
            match &node.kind {
                NodeKind::Source => fixed[i] = Some(config.source_voltage),
                NodeKind::Transformer(x) => fixed[i] = Some(x.output_voltage(config.source_voltage)),
                _ => {
                    index[i] = Some(unknowns.len());
                    unknowns.push(node.id);
                }
            }
        }

        Self {
            fixed,
            index,
            unknowns,
        }
    }

    /// Fixed voltage of `node`, if pinned.
    pub fn fixed_voltage(&self, node: NodeId) -> Option<f64> {
        self.fixed.get(node.0).copied().flatten()
    }

    /// Matrix row of `node`, if it is an unknown.
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(node.0).copied().flatten()
    }

    /// Unknown nodes in row order.
    pub fn unknowns(&self) -> &[NodeId] {
        &self.unknowns
    }

    /// All pinned nodes and their voltages.
    pub fn fixed_nodes(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.fixed
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (NodeId(i), v)))
    }
}
