//! Nodal grid solver.
//!
//! Each tick runs the same pipeline over the grid:
//!
//! 1. Build the conducting graph from the wires and current switch states
//! 2. Keep only the nodes reachable from the source
//! 3. Pin the source and transformers at fixed voltages
//! 4. Assemble the nodal system Gv = i for the remaining nodes
//! 5. Solve by Gaussian elimination with partial pivoting
//! 6. Carry capacitor voltages into the next tick
//! 7. Classify loads and compute wire metrics
//!
//! For an unknown node `i` the row reads:
//! ```text
//! (Σ g_ij + g_load + G_cap) v_i - Σ g_ij v_j = Σ g_ik V_k + I_eq
//! ```
//! where `j` runs over unknown neighbours, `k` over pinned neighbours, and
//! `G_cap`, `I_eq` come from the backward-Euler capacitor companion model.

mod metrics;
mod mna;
mod partition;
mod simulator;
mod state;
mod topology;
mod transient;

pub use metrics::{classify_loads, wire_metrics, WireMetrics};
pub use mna::{assemble, MnaMatrix};
pub use partition::Partition;
pub use simulator::Simulator;
pub use state::{solve, GridState};
pub use topology::{edge_resistance, Adjacency, Edge};
pub use transient::update_capacitors;

/// Smallest pivot accepted before the system is declared singular.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Floor on the effective capacitor time step, in seconds.
pub const MIN_CAPACITOR_STEP: f64 = 1e-5;
