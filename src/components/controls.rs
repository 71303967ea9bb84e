//! Control components: the transistor switch.

/// A transistor used as an on/off switch.
///
/// Modeled structurally rather than as a resistance:
/// - On: every incident wire gains the configured on-resistance
/// - Off: every incident wire is removed from the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    pub on: bool,
}

impl Switch {
    /// Create a new switch.
    pub fn new(on: bool) -> Self {
        Self { on }
    }

    /// Whether the switch disconnects its wires.
    pub fn is_open(&self) -> bool {
        !self.on
    }

    /// Set the switch state.
    pub fn set_state(&mut self, on: bool) {
        self.on = on;
    }

    /// Toggle the switch state, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.on
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(true)
    }
}
