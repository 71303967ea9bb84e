//! Grid validation.

use std::collections::HashSet;

use crate::components::{require_positive, NodeKind};
use crate::error::{GridError, Result};

use super::{Grid, NodeId, WireKey};

/// Validate a grid before handing it to the solver.
///
/// Checks:
/// - Node 0 is the only source
/// - Every wire joins two distinct existing nodes, at most once per pair
/// - Resistor, capacitor and transformer parameters are positive
///
/// Grids built through `Grid::add_*` always pass; this catches state edited in
/// place through `Grid::nodes_mut`.
pub fn validate_grid(grid: &Grid) -> Result<()> {
    for node in grid.nodes() {
        match &node.kind {
            NodeKind::Source if node.id != NodeId::SOURCE => {
                return Err(GridError::DuplicateSource {
                    existing: grid.source_name().to_string(),
                    name: node.name.clone(),
                });
            }
            NodeKind::Resistor(r) => {
                require_positive(&node.name, "ohms", r.ohms)?;
            }
            NodeKind::Capacitor(c) => {
                require_positive(&node.name, "capacitance", c.capacitance)?;
            }
            NodeKind::Transformer(x) => {
                require_positive(&node.name, "ratio", x.ratio)?;
            }
            _ => {}
        }
    }

    if !matches!(
        grid.node(NodeId::SOURCE).map(|n| &n.kind),
        Some(NodeKind::Source)
    ) {
        return Err(GridError::MissingSource);
    }

    let mut seen = HashSet::new();
    for wire in grid.wires() {
        for end in [wire.a, wire.b] {
            if grid.node(end).is_none() {
                return Err(GridError::NodeNotFound {
                    node: end.to_string(),
                });
            }
        }
        if wire.a == wire.b {
            return Err(GridError::SelfLoop {
                node: grid.node_name(wire.a).to_string(),
            });
        }
        if !seen.insert(WireKey::new(wire.a, wire.b)) {
            return Err(GridError::DuplicateWire {
                a: grid.node_name(wire.a).to_string(),
                b: grid.node_name(wire.b).to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Position;

    #[test]
    fn test_valid_grid_passes() {
        let mut grid = Grid::new("GEN");
        let h = grid.add_house("H1", Position::default()).unwrap();
        grid.add_wire(NodeId::SOURCE, h).unwrap();
        assert!(validate_grid(&grid).is_ok());
    }

    #[test]
    fn test_catches_in_place_edit() {
        let mut grid = Grid::new("GEN");
        let r = grid.add_resistor("R1", 2.0, Position::default()).unwrap();
        if let NodeKind::Resistor(res) = &mut grid.nodes_mut()[r.0].kind {
            res.ohms = -1.0;
        }
        assert!(matches!(
            validate_grid(&grid),
            Err(GridError::InvalidParameter { .. })
        ));
    }
}
