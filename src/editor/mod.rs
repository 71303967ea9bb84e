//! Interactive grid editing.
//!
//! The editor turns clicks into core calls: it places nodes through the
//! [`Palette`], wires pairs through the [`WiringTool`], and toggles
//! transistors. It only talks to the grid through [`Simulator`] methods, so
//! every accepted edit is followed by a re-solve.

mod palette;
mod wiring;

pub use palette::{
    parse_parameter, Palette, Tool, DEFAULT_CAPACITOR_UF, DEFAULT_RESISTOR_OHMS,
    DEFAULT_TRANSFORMER_RATIO,
};
pub use wiring::{WiringOutcome, WiringState, WiringTool};

use crate::circuit::{NodeId, Position};
use crate::components::NodeKind;
use crate::error::Result;
use crate::solver::Simulator;

/// Result of a single click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A wiring click
    Wiring(WiringOutcome),
    /// A new node was placed
    Placed(NodeId),
    /// A transistor was flipped; holds its new state
    Toggled { node: NodeId, on: bool },
    /// The click had no effect in the current tool
    Ignored,
}

/// Palette and wiring tool together.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub palette: Palette,
    wiring: WiringTool,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.palette.tool()
    }

    /// Switch tools. A wire in progress is dropped.
    pub fn select(&mut self, tool: Tool) {
        self.wiring.cancel();
        self.palette.select(tool);
    }

    pub fn wiring_state(&self) -> WiringState {
        self.wiring.state()
    }

    /// Handle a click on an existing node.
    pub fn click_node(&mut self, sim: &mut Simulator, node: NodeId) -> Result<ClickOutcome> {
        match self.palette.tool() {
            Tool::Wire => Ok(ClickOutcome::Wiring(self.wiring.click(sim, node)?)),
            Tool::PlaceTransistor => {
                let is_transistor = matches!(
                    sim.grid().node(node).map(|n| &n.kind),
                    Some(NodeKind::Transistor(_))
                );
                if !is_transistor {
                    return Ok(ClickOutcome::Ignored);
                }
                let name = sim.grid().node_name(node).to_string();
                let on = sim.toggle_switch(&name)?;
                Ok(ClickOutcome::Toggled { node, on })
            }
            _ => Ok(ClickOutcome::Ignored),
        }
    }

    /// Handle a click on empty ground: place with a placement tool, or
    /// cancel a wire in progress.
    pub fn click_empty(&mut self, sim: &mut Simulator, position: Position) -> Result<ClickOutcome> {
        if self.palette.tool() == Tool::Wire {
            return Ok(self
                .wiring
                .cancel()
                .map(ClickOutcome::Wiring)
                .unwrap_or(ClickOutcome::Ignored));
        }
        Ok(self
            .palette
            .place(sim, position)?
            .map(ClickOutcome::Placed)
            .unwrap_or(ClickOutcome::Ignored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LoadLevel;
    use crate::config::GridConfig;

    fn sim() -> Simulator {
        Simulator::from_source("SRC GEN x=140 y=285\n", &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_build_and_toggle_session() {
        let mut s = sim();
        let mut ed = Editor::new();

        ed.select(Tool::PlaceTransistor);
        let t = match ed.click_empty(&mut s, Position::new(300.0, 285.0)).unwrap() {
            ClickOutcome::Placed(id) => id,
            other => panic!("expected placement, got {:?}", other),
        };
        ed.select(Tool::PlaceHouse);
        let h = match ed.click_empty(&mut s, Position::new(700.0, 210.0)).unwrap() {
            ClickOutcome::Placed(id) => id,
            other => panic!("expected placement, got {:?}", other),
        };

        ed.select(Tool::Wire);
        ed.click_node(&mut s, NodeId::SOURCE).unwrap();
        ed.click_node(&mut s, t).unwrap();
        ed.click_node(&mut s, t).unwrap();
        ed.click_node(&mut s, h).unwrap();
        assert_eq!(s.load("H1").unwrap().level, LoadLevel::On);

        ed.select(Tool::PlaceTransistor);
        assert_eq!(
            ed.click_node(&mut s, t).unwrap(),
            ClickOutcome::Toggled { node: t, on: false }
        );
        assert_eq!(s.load("H1").unwrap().level, LoadLevel::Off);

        // Clicking a non-transistor in transistor mode does nothing
        assert_eq!(ed.click_node(&mut s, h).unwrap(), ClickOutcome::Ignored);
    }

    #[test]
    fn test_empty_click_cancels_wire() {
        let mut s = sim();
        let mut ed = Editor::new();
        assert_eq!(ed.click_empty(&mut s, Position::default()).unwrap(), ClickOutcome::Ignored);

        ed.click_node(&mut s, NodeId::SOURCE).unwrap();
        assert_eq!(
            ed.click_empty(&mut s, Position::default()).unwrap(),
            ClickOutcome::Wiring(WiringOutcome::Cancelled)
        );
        assert_eq!(ed.wiring_state(), WiringState::Idle);
    }

    #[test]
    fn test_tool_change_drops_wire() {
        let mut s = sim();
        let mut ed = Editor::new();
        ed.click_node(&mut s, NodeId::SOURCE).unwrap();
        ed.select(Tool::PlaceLed);
        assert_eq!(ed.wiring_state(), WiringState::Idle);
        assert_eq!(ed.tool(), Tool::PlaceLed);
    }
}
