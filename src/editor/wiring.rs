//! Two-click wiring state machine.

use crate::circuit::{NodeId, WireKey};
use crate::error::{GridError, Result};
use crate::solver::Simulator;

/// Where the wiring tool is between clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WiringState {
    #[default]
    Idle,
    /// First endpoint chosen, waiting for the second.
    WiringFrom(NodeId),
}

/// What a wiring click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringOutcome {
    Started(NodeId),
    Connected(WireKey),
    Cancelled,
}

/// The wiring tool. Always returns to `Idle` after a second click or a cancel.
#[derive(Debug, Clone, Default)]
pub struct WiringTool {
    state: WiringState,
}

impl WiringTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WiringState {
        self.state
    }

    /// Handle a click on `node`.
    ///
    /// The first click picks the start node. The second click wires the pair
    /// and re-solves; a self-loop or an already-wired pair is reported as
    /// `Cancelled`. Any other error is returned after resetting to `Idle`.
    pub fn click(&mut self, sim: &mut Simulator, node: NodeId) -> Result<WiringOutcome> {
        match self.state {
            WiringState::Idle => {
                if sim.grid().node(node).is_none() {
                    return Err(GridError::NodeNotFound {
                        node: node.to_string(),
                    });
                }
                self.state = WiringState::WiringFrom(node);
                Ok(WiringOutcome::Started(node))
            }
            WiringState::WiringFrom(from) => {
                self.state = WiringState::Idle;
                match sim.add_wire(from, node) {
                    Ok(key) => Ok(WiringOutcome::Connected(key)),
                    Err(GridError::SelfLoop { .. } | GridError::DuplicateWire { .. }) => {
                        Ok(WiringOutcome::Cancelled)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Abandon a wire in progress. Returns `None` when nothing was in progress.
    pub fn cancel(&mut self) -> Option<WiringOutcome> {
        match std::mem::take(&mut self.state) {
            WiringState::Idle => None,
            WiringState::WiringFrom(_) => Some(WiringOutcome::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn sim() -> Simulator {
        Simulator::from_source("SRC GEN\nHOUSE H1\nHOUSE H2\n", &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_two_clicks_connect() {
        let mut s = sim();
        let h1 = s.grid().require("H1").unwrap();
        let mut tool = WiringTool::new();

        assert_eq!(tool.click(&mut s, NodeId::SOURCE).unwrap(), WiringOutcome::Started(NodeId::SOURCE));
        assert_eq!(tool.state(), WiringState::WiringFrom(NodeId::SOURCE));
        assert_eq!(
            tool.click(&mut s, h1).unwrap(),
            WiringOutcome::Connected(WireKey::new(NodeId::SOURCE, h1))
        );
        assert_eq!(tool.state(), WiringState::Idle);
        assert!(s.node_voltage("H1").unwrap() > 11.9);
    }

    #[test]
    fn test_self_loop_and_duplicate_cancel() {
        let mut s = sim();
        let h1 = s.grid().require("H1").unwrap();
        let mut tool = WiringTool::new();

        tool.click(&mut s, h1).unwrap();
        assert_eq!(tool.click(&mut s, h1).unwrap(), WiringOutcome::Cancelled);
        assert_eq!(tool.state(), WiringState::Idle);

        tool.click(&mut s, h1).unwrap();
        tool.click(&mut s, NodeId::SOURCE).unwrap();
        tool.click(&mut s, NodeId::SOURCE).unwrap();
        assert_eq!(tool.click(&mut s, h1).unwrap(), WiringOutcome::Cancelled);
        assert_eq!(s.grid().wires().len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = sim();
        let mut tool = WiringTool::new();
        assert_eq!(tool.cancel(), None);
        tool.click(&mut s, NodeId::SOURCE).unwrap();
        assert_eq!(tool.cancel(), Some(WiringOutcome::Cancelled));
        assert_eq!(tool.state(), WiringState::Idle);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut s = sim();
        let mut tool = WiringTool::new();
        assert!(tool.click(&mut s, NodeId(42)).is_err());
        assert_eq!(tool.state(), WiringState::Idle);

        tool.click(&mut s, NodeId::SOURCE).unwrap();
        assert!(matches!(
            tool.click(&mut s, NodeId(42)),
            Err(GridError::NodeNotFound { .. })
        ));
        assert_eq!(tool.state(), WiringState::Idle);
    }
}
