//! Node models for grid simulation.
//!
//! Every grid element is a node; wires only connect nodes. This module provides
//! the per-kind payloads:
//! - Source: the generator, fixed at the configured voltage
//! - Loads: House, LED (fixed resistance to ground)
//! - Linear: Resistor (inline), Capacitor (to ground, transient)
//! - Controls: Transistor switch
//! - Sources: Transformer (fixed ratio of the generator voltage)

mod controls;
mod linear;
mod loads;
mod sources;

pub use controls::Switch;
pub use linear::{Capacitor, Companion, Resistor};
pub use loads::{LoadKind, LoadLevel, LoadReading};
pub use sources::Transformer;

use crate::circuit::{NodeId, Position};
use crate::config::GridConfig;
use crate::dsl::{NodeDef, NodeType};
use crate::error::{GridError, Result};

/// The kind of a node, with its kind-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Source,
    House,
    Led,
    Resistor(Resistor),
    Transistor(Switch),
    Capacitor(Capacitor),
    Transformer(Transformer),
}

impl NodeKind {
    /// Create a node kind from a grid file definition.
    pub fn from_def(def: &NodeDef, config: &GridConfig) -> Result<Self> {
        match def.node_type {
            NodeType::Source => Ok(NodeKind::Source),
            NodeType::House => Ok(NodeKind::House),
            NodeType::Led => Ok(NodeKind::Led),

            NodeType::Resistor => {
                let ohms = def.value.ok_or_else(|| {
                    GridError::invalid_parameter(&def.name, "ohms", "resistor requires a value")
                })?;
                let ohms = require_positive(&def.name, "ohms", ohms)?;
                Ok(NodeKind::Resistor(Resistor::new(ohms)))
            }

            NodeType::Capacitor => {
                let farads = def.value.ok_or_else(|| {
                    GridError::invalid_parameter(
                        &def.name,
                        "capacitance",
                        "capacitor requires a value",
                    )
                })?;
                let farads = require_positive(&def.name, "capacitance", farads)?;
                Ok(NodeKind::Capacitor(Capacitor::from_nominal(
                    farads,
                    config.capacitor_time_scale,
                )))
            }

            NodeType::Transformer => {
                let ratio = def.value.ok_or_else(|| {
                    GridError::invalid_parameter(&def.name, "ratio", "transformer requires a ratio")
                })?;
                let ratio = require_positive(&def.name, "ratio", ratio)?;
                Ok(NodeKind::Transformer(Transformer::new(ratio)))
            }

            NodeType::Transistor => Ok(NodeKind::Transistor(Switch::new(
                def.switch_on.unwrap_or(true),
            ))),
        }
    }

    /// Short uppercase tag, as used in grid files.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Source => "SRC",
            NodeKind::House => "HOUSE",
            NodeKind::Led => "LED",
            NodeKind::Resistor(_) => "RES",
            NodeKind::Transistor(_) => "TRANS",
            NodeKind::Capacitor(_) => "CAP",
            NodeKind::Transformer(_) => "XFMR",
        }
    }

    /// Load type, if this node is a load.
    pub fn load_kind(&self) -> Option<LoadKind> {
        match self {
            NodeKind::House => Some(LoadKind::House),
            NodeKind::Led => Some(LoadKind::Led),
            _ => None,
        }
    }

    /// Resistance this node adds to each incident wire.
    ///
    /// Returns `None` when the node opens the circuit (a switched-off
    /// transistor), in which case the wire carries no edge at all.
    pub fn series_resistance(&self, config: &GridConfig) -> Option<f64> {
        match self {
            NodeKind::Resistor(r) => Some(r.ohms),
            NodeKind::Transistor(s) if s.is_open() => None,
            NodeKind::Transistor(_) => Some(config.switch_on_resistance),
            NodeKind::Source
            | NodeKind::House
            | NodeKind::Led
            | NodeKind::Capacitor(_)
            | NodeKind::Transformer(_) => Some(0.0),
        }
    }
}

/// A grid node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub position: Position,
}

impl Node {
    /// Load type, if this node is a load.
    pub fn load_kind(&self) -> Option<LoadKind> {
        self.kind.load_kind()
    }

    /// Whether this node is a transistor currently switched off.
    pub fn is_open_switch(&self) -> bool {
        matches!(self.kind, NodeKind::Transistor(s) if s.is_open())
    }
}

/// Check a placement parameter is a finite positive number.
pub fn require_positive(node: &str, param: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GridError::invalid_parameter(
            node,
            param,
            format!("must be a positive number, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn def(node_type: NodeType, value: Option<f64>) -> NodeDef {
        NodeDef {
            node_type,
            name: "X".to_string(),
            value,
            switch_on: None,
            params: HashMap::new(),
            line: 1,
        }
    }

    #[test]
    fn test_series_resistance() {
        let config = GridConfig::default();
        assert_eq!(NodeKind::House.series_resistance(&config), Some(0.0));
        assert_eq!(
            NodeKind::Resistor(Resistor::new(2.0)).series_resistance(&config),
            Some(2.0)
        );
        assert_eq!(
            NodeKind::Transistor(Switch::new(true)).series_resistance(&config),
            Some(0.5)
        );
        assert_eq!(
            NodeKind::Transistor(Switch::new(false)).series_resistance(&config),
            None
        );
    }

    #[test]
    fn test_from_def_scales_capacitance() {
        let config = GridConfig::default().with_capacitor_time_scale(50.0);
        let kind = NodeKind::from_def(&def(NodeType::Capacitor, Some(1e-3)), &config).unwrap();
        match kind {
            NodeKind::Capacitor(c) => {
                assert!((c.capacitance - 0.05).abs() < 1e-12);
                assert_eq!(c.v_prev, 0.0);
            }
            other => panic!("expected capacitor, got {:?}", other),
        }
    }

    #[test]
    fn test_from_def_rejects_non_positive() {
        let config = GridConfig::default();
        assert!(NodeKind::from_def(&def(NodeType::Resistor, Some(0.0)), &config).is_err());
        assert!(NodeKind::from_def(&def(NodeType::Transformer, Some(-1.0)), &config).is_err());
        assert!(NodeKind::from_def(&def(NodeType::Resistor, None), &config).is_err());
    }

    #[test]
    fn test_transistor_defaults_on() {
        let config = GridConfig::default();
        let kind = NodeKind::from_def(&def(NodeType::Transistor, None), &config).unwrap();
        assert_eq!(kind, NodeKind::Transistor(Switch::new(true)));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("R1", "ohms", f64::NAN).is_err());
        assert!(require_positive("R1", "ohms", f64::INFINITY).is_err());
        assert_eq!(require_positive("R1", "ohms", 2.0).unwrap(), 2.0);
    }
}
