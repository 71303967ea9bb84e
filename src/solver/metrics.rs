//! Derived readouts: load classification and per-wire metrics.

use std::collections::BTreeMap;

use serde::Serialize;

use super::topology::edge_resistance;
use crate::circuit::{Grid, NodeId, WireKey};
use crate::components::LoadReading;
use crate::config::GridConfig;

/// Resistance, voltage drop and current along one wire.
///
/// `from`/`to` keep the wire's declared orientation, so a positive current
/// flows from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WireMetrics {
    pub from: NodeId,
    pub to: NodeId,
    pub resistance: f64,
    pub voltage_drop: f64,
    pub current: f64,
}

/// Readings for every load node.
///
/// Loads outside the reachable set are reported as unpowered without
/// consulting their thresholds.
pub fn classify_loads(
    grid: &Grid,
    config: &GridConfig,
    reachable: &[bool],
    voltages: &[f64],
) -> BTreeMap<NodeId, LoadReading> {
    grid.nodes()
        .iter()
        .filter_map(|node| {
            let kind = node.load_kind()?;
            let i = node.id.0;
            let reading = if reachable.get(i).copied().unwrap_or(false) {
                LoadReading::powered(kind, voltages[i], config.profile(kind))
            } else {
                LoadReading::unpowered(kind)
            };
            Some((node.id, reading))
        })
        .collect()
}

/// Metrics for every conducting wire, from already-solved voltages.
///
/// Wires opened by a switch or referencing a missing node are left out.
pub fn wire_metrics(
    grid: &Grid,
    config: &GridConfig,
    voltages: &[f64],
) -> BTreeMap<WireKey, WireMetrics> {
    let voltage = |id: NodeId| voltages.get(id.0).copied().unwrap_or(0.0);

    grid.wires()
        .iter()
        .filter_map(|wire| {
            let resistance = edge_resistance(grid, config, wire.a, wire.b)?;
            let voltage_drop = voltage(wire.a) - voltage(wire.b);
            let current = if resistance > 0.0 {
                voltage_drop / resistance
            } else {
                0.0
            };
            Some((
                wire.key(),
                WireMetrics {
                    from: wire.a,
                    to: wire.b,
                    resistance,
                    voltage_drop,
                    current,
                },
            ))
        })
        .collect()
}
