//! WASM bindings for Gridsim Core.
//!
//! JavaScript-friendly wrapper around [`Simulator`] and the [`Editor`], for a
//! canvas front-end that ticks once per animation frame.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmGrid } from 'gridsim_core';
//!
//! await init();
//!
//! const grid = new WasmGrid(`
//!   SRC   GEN x=140 y=285
//!   HOUSE H1  x=700 y=210
//!   WIRE  GEN H1
//! `);
//!
//! // In requestAnimationFrame:
//! grid.tick(1 / 60);
//! const state = JSON.parse(grid.state_json());
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Position;
use crate::components::{NodeKind, Resistor, Switch, Transformer};
use crate::config::GridConfig;
use crate::editor::{ClickOutcome, Editor, Tool, WiringOutcome};
use crate::error::GridError;
use crate::report::{HouseCheck, Snapshot};
use crate::solver::Simulator;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible town grid simulator.
#[wasm_bindgen]
pub struct WasmGrid {
    simulator: Simulator,
    editor: Editor,
}

#[wasm_bindgen]
impl WasmGrid {
    /// Create a simulator from grid text, with default constants.
    #[wasm_bindgen(constructor)]
    pub fn new(grid_text: &str) -> Result<WasmGrid, JsValue> {
        Self::with_config(grid_text, "{}")
    }

    /// Create a simulator from grid text and a JSON object of constant overrides.
    #[wasm_bindgen]
    pub fn with_config(grid_text: &str, config_json: &str) -> Result<WasmGrid, JsValue> {
        let config = GridConfig::from_json(config_json).map_err(js_error)?;
        let simulator = Simulator::from_source(grid_text, &config).map_err(js_error)?;
        Ok(WasmGrid {
            simulator,
            editor: Editor::new(),
        })
    }

    /// Advance one frame of `dt` seconds.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f64) {
        self.simulator.step(dt);
    }

    /// Add a house.
    #[wasm_bindgen]
    pub fn add_house(&mut self, name: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.simulator
            .add_node(name, NodeKind::House, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add an LED street light.
    #[wasm_bindgen]
    pub fn add_led(&mut self, name: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.simulator
            .add_node(name, NodeKind::Led, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add an inline resistor of `ohms`.
    #[wasm_bindgen]
    pub fn add_resistor(&mut self, name: &str, ohms: f64, x: f64, y: f64) -> Result<(), JsValue> {
        let kind = NodeKind::Resistor(Resistor::new(ohms));
        self.simulator
            .add_node(name, kind, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add a transistor switch, initially on.
    #[wasm_bindgen]
    pub fn add_transistor(&mut self, name: &str, x: f64, y: f64) -> Result<(), JsValue> {
        let kind = NodeKind::Transistor(Switch::new(true));
        self.simulator
            .add_node(name, kind, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add a capacitor of `microfarads` (nominal).
    #[wasm_bindgen]
    pub fn add_capacitor(
        &mut self,
        name: &str,
        microfarads: f64,
        x: f64,
        y: f64,
    ) -> Result<(), JsValue> {
        self.simulator
            .add_capacitor(name, microfarads * 1e-6, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add a transformer with a fixed voltage `ratio`.
    #[wasm_bindgen]
    pub fn add_transformer(&mut self, name: &str, ratio: f64, x: f64, y: f64) -> Result<(), JsValue> {
        let kind = NodeKind::Transformer(Transformer::new(ratio));
        self.simulator
            .add_node(name, kind, Position::new(x, y))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Wire two named nodes.
    #[wasm_bindgen]
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), JsValue> {
        self.simulator.connect(a, b).map(|_| ()).map_err(js_error)
    }

    /// Flip a transistor, returning its new state.
    #[wasm_bindgen]
    pub fn toggle(&mut self, name: &str) -> Result<bool, JsValue> {
        self.simulator.toggle_switch(name).map_err(js_error)
    }

    /// Select an editor tool by keyword (`WIRE`, `HOUSE`, `LED`, `RES`,
    /// `TRANS`, `CAP`, `XFMR`).
    #[wasm_bindgen]
    pub fn select_tool(&mut self, keyword: &str) -> Result<(), JsValue> {
        let tool = Tool::from_keyword(keyword).ok_or_else(|| {
            js_error(GridError::WasmError {
                message: format!("unknown tool '{}'", keyword),
            })
        })?;
        self.editor.select(tool);
        Ok(())
    }

    /// Set the current tool's placement value from user text.
    ///
    /// Rejected text leaves the previous value in place.
    #[wasm_bindgen]
    pub fn set_tool_value(&mut self, raw: &str) -> Result<f64, JsValue> {
        let palette = &mut self.editor.palette;
        let result = match palette.tool() {
            Tool::PlaceResistor => palette.set_resistor_ohms(raw),
            Tool::PlaceCapacitor => palette.set_capacitor_uf(raw),
            Tool::PlaceTransformer => palette.set_transformer_ratio(raw),
            other => Err(GridError::WasmError {
                message: format!("tool {} takes no value", other),
            }),
        };
        result.map_err(js_error)
    }

    /// Status line for the current tool.
    #[wasm_bindgen]
    pub fn tool_label(&self) -> String {
        self.editor.palette.label(self.simulator.config())
    }

    /// Click on a node. Returns the name of a placed or toggled node, or an
    /// empty string.
    #[wasm_bindgen]
    pub fn click_node(&mut self, name: &str) -> Result<String, JsValue> {
        let id = self.simulator.grid().require(name).map_err(js_error)?;
        let outcome = self
            .editor
            .click_node(&mut self.simulator, id)
            .map_err(js_error)?;
        Ok(self.describe(outcome))
    }

    /// Click on empty ground.
    #[wasm_bindgen]
    pub fn click_empty(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self
            .editor
            .click_empty(&mut self.simulator, Position::new(x, y))
            .map_err(js_error)?;
        Ok(self.describe(outcome))
    }

    /// Current state as a JSON object keyed by node name.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&Snapshot::capture(&self.simulator)).map_err(js_error)
    }

    /// Result of the house check, as shown on the status line.
    #[wasm_bindgen]
    pub fn run_check(&self) -> String {
        HouseCheck::run(&self.simulator).to_string()
    }

    /// Get the current voltage at a named node.
    ///
    /// Returns `undefined` if the node doesn't exist.
    #[wasm_bindgen]
    pub fn node_voltage(&self, name: &str) -> Option<f64> {
        self.simulator.node_voltage(name)
    }
}

impl WasmGrid {
    fn describe(&self, outcome: ClickOutcome) -> String {
        let grid = self.simulator.grid();
        match outcome {
            ClickOutcome::Placed(id) => grid.node_name(id).to_string(),
            ClickOutcome::Toggled { node, .. } => grid.node_name(node).to_string(),
            ClickOutcome::Wiring(WiringOutcome::Started(id)) => grid.node_name(id).to_string(),
            ClickOutcome::Wiring(WiringOutcome::Connected(key)) => {
                format!("{}|{}", grid.node_name(key.low()), grid.node_name(key.high()))
            }
            ClickOutcome::Wiring(WiringOutcome::Cancelled) | ClickOutcome::Ignored => String::new(),
        }
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
