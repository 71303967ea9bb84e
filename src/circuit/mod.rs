//! Grid graph representation and validation.
//!
//! This module provides the in-memory town grid: the node arena, the wire
//! list, and the boundary checks that keep invalid topology out of the solver.
//! The [`Grid`] struct is the explicit session context passed to the solver.

mod graph;
mod types;
mod validate;

pub use graph::Grid;
pub use types::*;
pub use validate::validate_grid;
