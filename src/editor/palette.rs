//! Placement tools and their default parameters.

use std::fmt;

use crate::circuit::{NodeId, Position};
use crate::components::{NodeKind, Resistor, Switch, Transformer};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::solver::Simulator;

/// Default inline resistor value in ohms.
pub const DEFAULT_RESISTOR_OHMS: f64 = 2.0;

/// Default capacitor value in microfarads.
pub const DEFAULT_CAPACITOR_UF: f64 = 220.0;

/// Default transformer ratio (step down to half).
pub const DEFAULT_TRANSFORMER_RATIO: f64 = 0.5;

/// The active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Wire,
    PlaceHouse,
    PlaceLed,
    PlaceResistor,
    PlaceTransistor,
    PlaceCapacitor,
    PlaceTransformer,
}

impl Tool {
    /// Short keyword, matching the grid file node keywords.
    pub fn keyword(&self) -> &'static str {
        match self {
            Tool::Wire => "WIRE",
            Tool::PlaceHouse => "HOUSE",
            Tool::PlaceLed => "LED",
            Tool::PlaceResistor => "RES",
            Tool::PlaceTransistor => "TRANS",
            Tool::PlaceCapacitor => "CAP",
            Tool::PlaceTransformer => "XFMR",
        }
    }

    /// Parse a keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let tool = match keyword.to_ascii_uppercase().as_str() {
            "WIRE" => Tool::Wire,
            "HOUSE" => Tool::PlaceHouse,
            "LED" => Tool::PlaceLed,
            "RES" => Tool::PlaceResistor,
            "TRANS" => Tool::PlaceTransistor,
            "CAP" => Tool::PlaceCapacitor,
            "XFMR" | "XFR" => Tool::PlaceTransformer,
            _ => return None,
        };
        Some(tool)
    }

    pub fn is_placement(&self) -> bool {
        !matches!(self, Tool::Wire)
    }

    /// Name prefix for nodes this tool places.
    fn prefix(&self) -> Option<&'static str> {
        match self {
            Tool::Wire => None,
            Tool::PlaceHouse => Some("H"),
            Tool::PlaceLed => Some("L"),
            Tool::PlaceResistor => Some("R"),
            Tool::PlaceTransistor => Some("T"),
            Tool::PlaceCapacitor => Some("C"),
            Tool::PlaceTransformer => Some("X"),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parse a user-entered placement value.
///
/// Only finite positive numbers are accepted; anything else is an
/// `InvalidParameter` error and the caller keeps its previous value.
pub fn parse_parameter(param: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        GridError::invalid_parameter("palette", param, format!("'{}' is not a number", raw.trim()))
    })?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GridError::invalid_parameter(
            "palette",
            param,
            format!("must be a positive number, got {}", value),
        ))
    }
}

/// Current tool plus the values and names the next placement will use.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    tool: Tool,
    resistor_ohms: f64,
    capacitor_uf: f64,
    transformer_ratio: f64,
    /// Next auto-name number per placement prefix
    counters: [u32; 6],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tool: Tool::Wire,
            resistor_ohms: DEFAULT_RESISTOR_OHMS,
            capacitor_uf: DEFAULT_CAPACITOR_UF,
            transformer_ratio: DEFAULT_TRANSFORMER_RATIO,
            counters: [1; 6],
        }
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn select(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn resistor_ohms(&self) -> f64 {
        self.resistor_ohms
    }

    pub fn capacitor_uf(&self) -> f64 {
        self.capacitor_uf
    }

    pub fn transformer_ratio(&self) -> f64 {
        self.transformer_ratio
    }

    /// Set the resistor value from user text; the old value survives a rejection.
    pub fn set_resistor_ohms(&mut self, raw: &str) -> Result<f64> {
        self.resistor_ohms = parse_parameter("ohms", raw)?;
        Ok(self.resistor_ohms)
    }

    /// Set the capacitor value in microfarads from user text.
    pub fn set_capacitor_uf(&mut self, raw: &str) -> Result<f64> {
        self.capacitor_uf = parse_parameter("capacitance", raw)?;
        Ok(self.capacitor_uf)
    }

    /// Set the transformer ratio from user text.
    pub fn set_transformer_ratio(&mut self, raw: &str) -> Result<f64> {
        self.transformer_ratio = parse_parameter("ratio", raw)?;
        Ok(self.transformer_ratio)
    }

    /// Status line text for the current tool.
    pub fn label(&self, config: &GridConfig) -> String {
        match self.tool {
            Tool::Wire => "Tool: WIRE".to_string(),
            Tool::PlaceHouse => format!("Tool: HOUSE (needs ~{:.0}V)", config.house.v_on),
            Tool::PlaceLed => format!("Tool: LED (needs ~{:.0}V)", config.led.v_on),
            Tool::PlaceResistor => format!("Tool: RES ({:.2}Ω)", self.resistor_ohms),
            Tool::PlaceTransistor => "Tool: TRANS (click device to toggle)".to_string(),
            Tool::PlaceCapacitor => format!("Tool: CAP ({:.0}µF)", self.capacitor_uf),
            Tool::PlaceTransformer => format!("Tool: XFMR (ratio {:.2}×)", self.transformer_ratio),
        }
    }

    /// Place a node for the current tool at `position` and re-solve.
    ///
    /// Returns `Ok(None)` for the wiring tool, which places nothing.
    pub fn place(&mut self, sim: &mut Simulator, position: Position) -> Result<Option<NodeId>> {
        let Some(name) = self.next_name(sim) else {
            return Ok(None);
        };

        let id = match self.tool {
            Tool::Wire => return Ok(None),
            Tool::PlaceHouse => sim.add_node(name, NodeKind::House, position)?,
            Tool::PlaceLed => sim.add_node(name, NodeKind::Led, position)?,
            Tool::PlaceResistor => sim.add_node(
                name,
                NodeKind::Resistor(Resistor::new(self.resistor_ohms)),
                position,
            )?,
            Tool::PlaceTransistor => {
                sim.add_node(name, NodeKind::Transistor(Switch::new(true)), position)?
            }
            Tool::PlaceCapacitor => sim.add_capacitor(name, self.capacitor_uf * 1e-6, position)?,
            Tool::PlaceTransformer => sim.add_node(
                name,
                NodeKind::Transformer(Transformer::new(self.transformer_ratio)),
                position,
            )?,
        };
        Ok(Some(id))
    }

    /// Claim the next free auto-name for the current tool, skipping names
    /// already used in the grid.
    fn next_name(&mut self, sim: &Simulator) -> Option<String> {
        let prefix = self.tool.prefix()?;
        let slot = self.tool as usize - 1;
        loop {
            let name = format!("{}{}", prefix, self.counters[slot]);
            self.counters[slot] += 1;
            if sim.grid().find_node(&name).is_none() {
                return Some(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LoadLevel;

    fn sim() -> Simulator {
        Simulator::from_source("SRC GEN\n", &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!(parse_parameter("ohms", " 4.7 ").unwrap(), 4.7);
        assert!(parse_parameter("ohms", "0").is_err());
        assert!(parse_parameter("ohms", "-3").is_err());
        assert!(parse_parameter("ohms", "abc").is_err());
        assert!(parse_parameter("ohms", "inf").is_err());
        assert!(parse_parameter("ohms", "NaN").is_err());
        assert!(parse_parameter("ohms", "").is_err());
    }

    #[test]
    fn test_rejected_value_keeps_default() {
        let mut palette = Palette::new();
        assert!(palette.set_resistor_ohms("-1").is_err());
        assert_eq!(palette.resistor_ohms(), DEFAULT_RESISTOR_OHMS);
        assert_eq!(palette.set_resistor_ohms("10").unwrap(), 10.0);
        assert!(palette.set_capacitor_uf("0").is_err());
        assert_eq!(palette.capacitor_uf(), DEFAULT_CAPACITOR_UF);
        assert!(palette.set_transformer_ratio("x").is_err());
        assert_eq!(palette.transformer_ratio(), DEFAULT_TRANSFORMER_RATIO);
    }

    #[test]
    fn test_labels() {
        let config = GridConfig::default();
        let mut palette = Palette::new();
        assert_eq!(palette.label(&config), "Tool: WIRE");
        palette.select(Tool::PlaceResistor);
        assert_eq!(palette.label(&config), "Tool: RES (2.00Ω)");
        palette.select(Tool::PlaceCapacitor);
        assert_eq!(palette.label(&config), "Tool: CAP (220µF)");
        palette.select(Tool::PlaceTransformer);
        assert_eq!(palette.label(&config), "Tool: XFMR (ratio 0.50×)");
        palette.select(Tool::PlaceHouse);
        assert_eq!(palette.label(&config), "Tool: HOUSE (needs ~9V)");
        palette.select(Tool::PlaceLed);
        assert_eq!(palette.label(&config), "Tool: LED (needs ~3V)");
    }

    #[test]
    fn test_place_names_and_values() {
        let mut s = sim();
        let mut palette = Palette::new();
        assert_eq!(palette.place(&mut s, Position::default()).unwrap(), None);

        palette.select(Tool::PlaceHouse);
        let h1 = palette.place(&mut s, Position::new(700.0, 210.0)).unwrap().unwrap();
        let h2 = palette.place(&mut s, Position::new(700.0, 310.0)).unwrap().unwrap();
        assert_eq!(s.grid().node_name(h1), "H1");
        assert_eq!(s.grid().node_name(h2), "H2");
        assert_eq!(s.grid().node(h2).unwrap().position, Position::new(700.0, 310.0));

        palette.select(Tool::PlaceResistor);
        palette.set_resistor_ohms("5").unwrap();
        let r = palette.place(&mut s, Position::default()).unwrap().unwrap();
        assert_eq!(
            s.grid().node(r).unwrap().kind,
            NodeKind::Resistor(Resistor::new(5.0))
        );

        palette.select(Tool::PlaceCapacitor);
        let c = palette.place(&mut s, Position::default()).unwrap().unwrap();
        match &s.grid().node(c).unwrap().kind {
            NodeKind::Capacitor(cap) => {
                let nominal = cap.nominal_farads(s.config().capacitor_time_scale);
                assert!((nominal - 220e-6).abs() < 1e-12);
            }
            other => panic!("expected capacitor, got {:?}", other),
        }

        assert_eq!(s.load("H1").unwrap().level, LoadLevel::Off);
    }

    #[test]
    fn test_auto_name_skips_taken() {
        let mut s = Simulator::from_source("SRC GEN\nLED L1\n", &GridConfig::default()).unwrap();
        let mut palette = Palette::new();
        palette.select(Tool::PlaceLed);
        let id = palette.place(&mut s, Position::default()).unwrap().unwrap();
        assert_eq!(s.grid().node_name(id), "L2");
    }

    #[test]
    fn test_tool_keywords() {
        assert_eq!(Tool::from_keyword("xfmr"), Some(Tool::PlaceTransformer));
        assert_eq!(Tool::from_keyword("wire"), Some(Tool::Wire));
        assert_eq!(Tool::from_keyword("DIODE"), None);
        assert!(!Tool::Wire.is_placement());
        assert_eq!(Tool::PlaceCapacitor.to_string(), "CAP");
    }
}
