//! Main simulator interface.

use tracing::{debug, info};

use super::metrics::WireMetrics;
use super::state::{solve, GridState};
use crate::circuit::{validate_grid, Grid, NodeId, Position, WireKey};
use crate::components::{LoadReading, NodeKind};
use crate::config::GridConfig;
use crate::dsl;
use crate::error::Result;

/// The grid simulator.
///
/// Owns the grid and its configuration, and holds the snapshot from the most
/// recent solve. Every edit re-solves with `config.default_dt` so the
/// snapshot always describes the current topology.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The grid being simulated
    grid: Grid,
    /// Electrical constants
    config: GridConfig,
    /// Snapshot from the latest solve
    state: GridState,
    /// Ticks advanced through `step`
    ticks: u64,
    /// Simulated seconds advanced through `step`
    elapsed: f64,
}

impl Simulator {
    /// Create a simulator for `grid`, validating both inputs and solving once.
    pub fn new(grid: Grid, config: GridConfig) -> Result<Self> {
        config.validate()?;
        validate_grid(&grid)?;

        info!(
            nodes = grid.num_nodes(),
            wires = grid.wires().len(),
            source = grid.source_name(),
            "grid loaded"
        );

        let mut sim = Self {
            grid,
            config,
            state: GridState::default(),
            ticks: 0,
            elapsed: 0.0,
        };
        sim.refresh();
        Ok(sim)
    }

    /// Parse grid text and build a simulator. `.param` lines in the text
    /// override values in `base`.
    pub fn from_source(source: &str, base: &GridConfig) -> Result<Self> {
        let ast = dsl::parse(source)?;
        let (grid, config) = Grid::from_ast(&ast, base)?;
        Self::new(grid, config)
    }

    /// Advance one tick of `dt` seconds.
    pub fn step(&mut self, dt: f64) -> &GridState {
        self.state = solve(&mut self.grid, &self.config, dt);
        self.ticks += 1;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        &self.state
    }

    /// Advance `n` ticks of `dt` seconds.
    pub fn run(&mut self, n: u64, dt: f64) -> &GridState {
        for _ in 0..n {
            self.state = solve(&mut self.grid, &self.config, dt);
            self.ticks += 1;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt * n as f64;
        }
        &self.state
    }

    /// Re-solve after an edit, using the default tick length.
    pub fn refresh(&mut self) -> &GridState {
        self.state = solve(&mut self.grid, &self.config, self.config.default_dt);
        &self.state
    }

    /// Add a node and re-solve.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        position: Position,
    ) -> Result<NodeId> {
        let id = self.grid.add_node(name, kind, position)?;
        debug!(node = self.grid.node_name(id), "node added");
        self.refresh();
        Ok(id)
    }

    /// Add a capacitor from its nominal value and re-solve.
    pub fn add_capacitor(
        &mut self,
        name: impl Into<String>,
        farads: f64,
        position: Position,
    ) -> Result<NodeId> {
        let id = self
            .grid
            .add_capacitor(name, farads, self.config.capacitor_time_scale, position)?;
        self.refresh();
        Ok(id)
    }

    /// Wire two nodes and re-solve.
    pub fn add_wire(&mut self, a: NodeId, b: NodeId) -> Result<WireKey> {
        let key = self.grid.add_wire(a, b)?;
        debug!(wire = %key, "wire added");
        self.refresh();
        Ok(key)
    }

    /// Wire two nodes by name and re-solve.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<WireKey> {
        let a = self.grid.require(a)?;
        let b = self.grid.require(b)?;
        self.add_wire(a, b)
    }

    /// Flip a transistor by name, re-solve, and return its new state.
    pub fn toggle_switch(&mut self, name: &str) -> Result<bool> {
        let id = self.grid.require(name)?;
        let on = self.grid.toggle_switch(id)?;
        debug!(node = name, on, "switch toggled");
        self.refresh();
        Ok(on)
    }

    /// Set a transistor by name and re-solve.
    pub fn set_switch(&mut self, name: &str, on: bool) -> Result<()> {
        let id = self.grid.require(name)?;
        self.grid.set_switch(id, on)?;
        self.refresh();
        Ok(())
    }

    /// Snapshot from the latest solve.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Get the current voltage at a node by name.
    pub fn node_voltage(&self, name: &str) -> Option<f64> {
        let id = self.grid.find_node(name)?;
        Some(self.state.voltage(id))
    }

    /// Get the current reading of a load by name.
    pub fn load(&self, name: &str) -> Option<&LoadReading> {
        let id = self.grid.find_node(name)?;
        self.state.load(id)
    }

    /// Get the metrics of the wire between two named nodes.
    pub fn wire(&self, a: &str, b: &str) -> Option<&WireMetrics> {
        let a = self.grid.find_node(a)?;
        let b = self.grid.find_node(b)?;
        self.state.wire(a, b)
    }
}
