//! Capacitor memory update after each solve.

use crate::circuit::{Grid, NodeId};
use crate::components::NodeKind;

/// Carry each capacitor's solved voltage into the next tick.
///
/// A capacitor cut off from the source is treated as fully discharged.
pub fn update_capacitors(grid: &mut Grid, reachable: &[bool], voltages: &[f64]) {
    for node in grid.nodes_mut() {
        let NodeId(i) = node.id;
        if let NodeKind::Capacitor(c) = &mut node.kind {
            if reachable.get(i).copied().unwrap_or(false) {
                c.update_state(voltages.get(i).copied().unwrap_or(0.0));
            } else {
                c.discharge();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Position;

    fn v_prev(grid: &Grid, id: NodeId) -> f64 {
        match &grid.node(id).unwrap().kind {
            NodeKind::Capacitor(c) => c.v_prev,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reachable_capacitor_records_voltage() {
        let mut grid = Grid::new("GEN");
        let c = grid.add_capacitor("C1", 1e-3, 100.0, Position::default()).unwrap();
        update_capacitors(&mut grid, &[true, true], &[12.0, 4.5]);
        assert_eq!(v_prev(&grid, c), 4.5);
    }

    #[test]
    fn test_isolated_capacitor_discharges() {
        let mut grid = Grid::new("GEN");
        let c = grid.add_capacitor("C1", 1e-3, 100.0, Position::default()).unwrap();
        update_capacitors(&mut grid, &[true, true], &[12.0, 4.5]);
        update_capacitors(&mut grid, &[true, false], &[12.0, 0.0]);
        assert_eq!(v_prev(&grid, c), 0.0);
    }
}
