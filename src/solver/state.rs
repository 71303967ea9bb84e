//! The per-tick solve pass and the snapshot it produces.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::metrics::{classify_loads, wire_metrics, WireMetrics};
use super::mna::assemble;
use super::partition::Partition;
use super::topology::Adjacency;
use super::transient::update_capacitors;
use crate::circuit::{Grid, NodeId, WireKey};
use crate::components::LoadReading;
use crate::config::GridConfig;

/// Everything a renderer needs after one solve.
///
/// A `GridState` is built in full before it is handed out, so a holder
/// never sees a mix of two ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridState {
    /// Voltage of every node; unreachable nodes read 0
    pub voltages: BTreeMap<NodeId, f64>,
    /// Reading for every house and LED
    pub loads: BTreeMap<NodeId, LoadReading>,
    /// Metrics for every conducting wire
    pub wires: BTreeMap<WireKey, WireMetrics>,
    /// Nodes connected to the source through conducting wires
    pub reachable: BTreeSet<NodeId>,
    /// Set when the nodal matrix was singular and the unknowns were zeroed
    pub degenerate: bool,
}

impl GridState {
    /// Voltage at `node`, 0 for anything not in the snapshot.
    pub fn voltage(&self, node: NodeId) -> f64 {
        self.voltages.get(&node).copied().unwrap_or(0.0)
    }

    pub fn load(&self, node: NodeId) -> Option<&LoadReading> {
        self.loads.get(&node)
    }

    /// Metrics of the wire between `a` and `b`, in either order.
    pub fn wire(&self, a: NodeId, b: NodeId) -> Option<&WireMetrics> {
        self.wires.get(&WireKey::new(a, b))
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.reachable.contains(&node)
    }
}

/// Solve the grid for one tick of length `dt` seconds.
///
/// Builds the conducting graph, keeps only the part reachable from the
/// source, pins the source and transformers, solves the nodal system for
/// the rest, then advances capacitor memory and derives load and wire
/// readouts. Capacitor `v_prev` is the only state written back to `grid`.
///
/// This never fails: a singular system de-energizes every unknown node
/// and sets [`GridState::degenerate`].
pub fn solve(grid: &mut Grid, config: &GridConfig, dt: f64) -> GridState {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

    let adjacency = Adjacency::build(grid, config);
    let reachable = adjacency.reachable_from(NodeId::SOURCE);
    let partition = Partition::new(grid, config, &reachable);

    let mut matrix = assemble(grid, config, &adjacency, &partition, dt);
    let solved = matrix.solve();

    let mut voltages = vec![0.0; grid.num_nodes()];
    for (id, v) in partition.fixed_nodes() {
        voltages[id.0] = v;
    }
    for (row, id) in partition.unknowns().iter().enumerate() {
        voltages[id.0] = matrix.x[row];
    }

    debug!(
        nodes = grid.num_nodes(),
        reachable = reachable.iter().filter(|r| **r).count(),
        unknowns = partition.unknowns().len(),
        solved,
        dt,
        "grid solved"
    );

    update_capacitors(grid, &reachable, &voltages);

    GridState {
        loads: classify_loads(grid, config, &reachable, &voltages),
        wires: wire_metrics(grid, config, &voltages),
        reachable: reachable
            .iter()
            .enumerate()
            .filter(|(_, r)| **r)
            .map(|(i, _)| NodeId(i))
            .collect(),
        voltages: voltages
            .into_iter()
            .enumerate()
            .map(|(i, v)| (NodeId(i), v))
            .collect(),
        degenerate: !solved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Position;
    use crate::components::LoadLevel;
    use approx::assert_relative_eq;

    fn p() -> Position {
        Position::default()
    }

    #[test]
    fn test_single_house_divider() {
        let config = GridConfig::default();
        let mut grid = Grid::new("GEN");
        let h = grid.add_house("H1", p()).unwrap();
        grid.add_wire(NodeId::SOURCE, h).unwrap();

        let state = solve(&mut grid, &config, 1.0 / 60.0);
        let expected = 12.0 * 18.0 / 18.03;
        assert_relative_eq!(state.voltage(h), expected, epsilon = 1e-9);
        assert_relative_eq!(state.voltage(h), 11.980, epsilon = 1e-3);
        assert_eq!(state.load(h).unwrap().level, LoadLevel::On);
        assert_relative_eq!(state.load(h).unwrap().current, expected / 18.0, epsilon = 1e-9);
        assert!(!state.degenerate);
    }

    #[test]
    fn test_isolated_grid() {
        let config = GridConfig::default();
        let mut grid = Grid::new("GEN");
        let h = grid.add_house("H1", p()).unwrap();
        let l = grid.add_led("L1", p()).unwrap();
        grid.add_wire(h, l).unwrap();

        let state = solve(&mut grid, &config, 1.0 / 60.0);
        assert_eq!(state.voltage(NodeId::SOURCE), 12.0);
        assert_eq!(state.voltage(h), 0.0);
        assert_eq!(state.voltage(l), 0.0);
        assert_eq!(state.load(l).unwrap().level, LoadLevel::Off);
        assert_eq!(state.load(l).unwrap().current, 0.0);
        assert_eq!(state.reachable.len(), 1);
        // Wire metrics still cover the dead wire
        assert_eq!(state.wire(l, h).unwrap().current, 0.0);
    }

    #[test]
    fn test_source_only() {
        let config = GridConfig::default();
        let mut grid = Grid::new("GEN");
        let state = solve(&mut grid, &config, 0.0);
        assert_eq!(state.voltages.len(), 1);
        assert!(state.loads.is_empty());
        assert!(state.is_reachable(NodeId::SOURCE));
    }

    #[test]
    fn test_floating_branch_has_no_ground_path() {
        // A resistor hanging off the source with nothing behind it sits at
        // source potential.
        let config = GridConfig::default();
        let mut grid = Grid::new("GEN");
        let r = grid.add_resistor("R1", 2.0, p()).unwrap();
        grid.add_wire(NodeId::SOURCE, r).unwrap();

        let state = solve(&mut grid, &config, 1.0 / 60.0);
        assert_relative_eq!(state.voltage(r), 12.0, epsilon = 1e-9);
        assert_relative_eq!(state.wire(NodeId::SOURCE, r).unwrap().current, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_dt_is_treated_as_zero() {
        let config = GridConfig::default();
        let mut grid = Grid::new("GEN");
        let c = grid.add_capacitor("C1", 220e-6, 100.0, p()).unwrap();
        grid.add_wire(NodeId::SOURCE, c).unwrap();
        let state = solve(&mut grid, &config, f64::NAN);
        assert!(state.voltage(c).is_finite());
    }
}
