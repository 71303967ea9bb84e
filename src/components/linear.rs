//! Linear passive components: Resistor, Capacitor.

use crate::solver::MIN_CAPACITOR_STEP;

/// An inline resistor node.
///
/// The resistor has no to-ground path of its own. Its ohms are added to every
/// wire that touches it, so a resistor sitting between two wires contributes
/// its value to both of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistor {
    pub ohms: f64,
}

impl Resistor {
    /// Create a new resistor. `ohms` must already be validated as positive.
    pub fn new(ohms: f64) -> Self {
        Self { ohms }
    }
}

/// Conductance and history current standing in for a capacitor during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Companion {
    /// Companion conductance to ground, `G = C / dt_eff`.
    pub conductance: f64,
    /// Companion current injected into the node, `I_eq = G * v_prev`.
    pub current: f64,
}

/// A capacitor from its node to ground.
///
/// In discrete time the capacitor is replaced by a backward Euler companion
/// model:
///   i(n) = G * (v(n) - v(n-1)),  G = C / dt_eff
///
/// which stamps as a conductance G to ground plus a current source
/// I_eq = G * v(n-1) into the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitor {
    /// Effective capacitance: nominal farads times the session time scale.
    pub capacitance: f64,
    /// Node voltage at the end of the previous tick.
    pub v_prev: f64,
}

impl Capacitor {
    /// Create an uncharged capacitor with an already-scaled capacitance.
    pub fn new(capacitance: f64) -> Self {
        Self {
            capacitance,
            v_prev: 0.0,
        }
    }

    /// Create an uncharged capacitor from a nominal value in farads.
    pub fn from_nominal(farads: f64, time_scale: f64) -> Self {
        Self::new(farads * time_scale)
    }

    /// Nominal capacitance in farads, undoing the time scale.
    pub fn nominal_farads(&self, time_scale: f64) -> f64 {
        self.capacitance / time_scale
    }

    /// Companion pair for a tick of `dt` seconds.
    ///
    /// `slow_factor` shrinks the effective step: a smaller step gives a larger
    /// conductance, which pins the node closer to `v_prev` and slows charging.
    pub fn companion(&self, dt: f64, slow_factor: f64) -> Companion {
        let dt_eff = (dt * slow_factor).max(MIN_CAPACITOR_STEP);
        let conductance = self.capacitance / dt_eff;
        Companion {
            conductance,
            current: conductance * self.v_prev,
        }
    }

    /// Record the solved node voltage for the next tick.
    pub fn update_state(&mut self, v_new: f64) {
        self.v_prev = v_new;
    }

    /// Reset memory when the capacitor is cut off from the source.
    pub fn discharge(&mut self) {
        self.v_prev = 0.0;
    }
}
