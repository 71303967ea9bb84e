//! Nodal matrix assembly and solving.

use tracing::{trace, warn};

use super::partition::Partition;
use super::topology::Adjacency;
use super::PIVOT_EPSILON;
use crate::circuit::Grid;
use crate::components::NodeKind;
use crate::config::GridConfig;

/// Nodal system Ax = z over the unknown node voltages.
#[derive(Debug, Clone)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Solution vector x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Solve by Gaussian elimination with partial pivoting on [A|z].
    ///
    /// If any column's best pivot is below `PIVOT_EPSILON` the system is
    /// treated as degenerate: `x` is zeroed and `false` is returned.
    pub fn solve(&mut self) -> bool {
        let n = self.size;
        let w = n + 1;

        let mut m = vec![0.0; n * w];
        for r in 0..n {
            m[r * w..r * w + n].copy_from_slice(&self.a[r * n..(r + 1) * n]);
            m[r * w + n] = self.z[r];
        }

        for k in 0..n {
            let mut max_row = k;
            let mut max_val = m[k * w + k].abs();
            for i in (k + 1)..n {
                let val = m[i * w + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < PIVOT_EPSILON {
                warn!(column = k, pivot = max_val, "singular grid matrix, de-energizing");
                self.x.fill(0.0);
                return false;
            }

            if max_row != k {
                for j in k..w {
                    m.swap(k * w + j, max_row * w + j);
                }
            }

            let pivot = m[k * w + k];
            for i in (k + 1)..n {
                let factor = m[i * w + k] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in k..w {
                    m[i * w + j] -= factor * m[k * w + j];
                }
            }
        }

        // Back substitution
        for i in (0..n).rev() {
            let mut sum = m[i * w + n];
            for j in (i + 1)..n {
                sum -= m[i * w + j] * self.x[j];
            }
            self.x[i] = sum / m[i * w + i];
        }

        true
    }
}

/// Assemble the nodal system for the reachable, non-fixed nodes.
///
/// Row i collects, for unknown node i:
/// - every incident edge conductance on the diagonal,
/// - minus the edge conductance to each unknown neighbour,
/// - `G * V` on the right-hand side for each pinned neighbour,
/// - the load's ground conductance for houses and LEDs,
/// - the companion conductance and current for capacitors.
pub fn assemble(
    grid: &Grid,
    config: &GridConfig,
    adjacency: &Adjacency,
    partition: &Partition,
    dt: f64,
) -> MnaMatrix {
    let unknowns = partition.unknowns();
    let mut matrix = MnaMatrix::new(unknowns.len());
    let slow = config.effective_slow_factor();

    for (i, &id) in unknowns.iter().enumerate() {
        let Some(node) = grid.node(id) else {
            continue;
        };

        let mut diagonal = 0.0;
        for edge in adjacency.neighbors(id) {
            let g = edge.conductance();
            diagonal += g;
            if let Some(v) = partition.fixed_voltage(edge.to) {
                matrix.add_source(i, g * v);
            } else if let Some(j) = partition.index_of(edge.to) {
                matrix.add(i, j, -g);
            }
        }

        if let Some(kind) = node.load_kind() {
            diagonal += config.profile(kind).ground_conductance();
        }

        if let NodeKind::Capacitor(c) = &node.kind {
            let companion = c.companion(dt, slow);
            trace!(node = %id, g = companion.conductance, i_eq = companion.current, "capacitor");
            diagonal += companion.conductance;
            matrix.add_source(i, companion.current);
        }

        matrix.add(i, i, diagonal);
    }

    matrix
}
