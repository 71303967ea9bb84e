//! # Gridsim Core
//!
//! A simulator for a small town power grid: a generator, houses, LED street
//! lights, and the wires, resistors, transistor switches, capacitors and
//! transformers between them.
//!
//! This library provides:
//! - A line-oriented text format for describing grids
//! - A nodal-analysis solver run once per animation tick
//! - Load classification (ON / DIM / OFF) and per-wire metrics
//! - An editor layer for placing nodes and drawing wires
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the grid description format
//! - [`circuit`] - Grid arena (nodes and wires) and validation
//! - [`components`] - Node kinds and their parameters
//! - [`config`] - Electrical constants
//! - [`solver`] - Per-tick solve pipeline and the [`Simulator`]
//! - [`editor`] - Placement palette and wiring state machine
//! - [`report`] - Text and JSON output
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! gridsim town.grid --ticks 600 --every 60 --toggle T1@300
//! ```
//!
//! ### Library
//!
//! ```
//! use gridsim_core::{GridConfig, Simulator};
//!
//! let mut sim = Simulator::from_source(
//!     "SRC GEN\nHOUSE H1\nWIRE GEN H1\n",
//!     &GridConfig::default(),
//! )?;
//! sim.step(1.0 / 60.0);
//! assert!(sim.node_voltage("H1").unwrap() > 11.9);
//! # Ok::<(), gridsim_core::GridError>(())
//! ```
//!
//! ## Solve Method
//!
//! Each tick:
//!
//! 1. Build the conducting graph; open transistors drop their wires
//! 2. Keep the part reachable from the generator; everything else reads 0 V
//! 3. Pin the generator and transformers, solve the nodal system for the rest
//! 4. Update capacitor memory, classify loads, compute wire currents
//!
//! Capacitors use a backward Euler companion model, slowed by a
//! configurable factor so charging is visible at frame rate.

pub mod circuit;
pub mod components;
pub mod config;
pub mod dsl;
pub mod editor;
pub mod error;
pub mod report;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Grid;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use solver::{GridState, Simulator};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmGrid;
