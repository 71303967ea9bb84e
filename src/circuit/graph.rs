//! Grid graph structure.

use std::collections::{HashMap, HashSet};

use super::types::{NodeId, Position, Wire, WireKey};
use crate::components::{
    require_positive, Capacitor, Node, NodeKind, Resistor, Switch, Transformer,
};
use crate::config::GridConfig;
use crate::dsl::{GridAst, NodeType};
use crate::error::{GridError, Result};

/// A town grid: an append-only arena of nodes and the wires between them.
///
/// Node 0 is always the source. Node and wire insertion goes through the
/// `add_*` methods, which reject anything the solver must never see:
/// unknown endpoints, self-loops, repeated pairs and non-positive parameters.
#[derive(Debug, Clone)]
pub struct Grid {
    /// All nodes, indexed by `NodeId`
    nodes: Vec<Node>,

    /// All wires in insertion order
    wires: Vec<Wire>,

    /// Mapping from node names to node IDs
    node_map: HashMap<String, NodeId>,

    /// Unordered pairs already wired
    wired_pairs: HashSet<WireKey>,
}

impl Grid {
    /// Create a grid holding only the source node.
    pub fn new(source_name: impl Into<String>) -> Self {
        let name = source_name.into();
        let mut node_map = HashMap::new();
        node_map.insert(name.clone(), NodeId::SOURCE);
        Self {
            nodes: vec![Node {
                id: NodeId::SOURCE,
                name,
                kind: NodeKind::Source,
                position: Position::default(),
            }],
            wires: Vec::new(),
            node_map,
            wired_pairs: HashSet::new(),
        }
    }

    /// Build a grid from a parsed grid file.
    ///
    /// Returns the grid and the configuration with any `.param` overrides
    /// applied on top of `base`.
    pub fn from_ast(ast: &GridAst, base: &GridConfig) -> Result<(Self, GridConfig)> {
        let mut config = base.clone();
        for param in &ast.params {
            if !config.set_param(&param.name, param.value) {
                return Err(GridError::parse(
                    param.line,
                    format!("unknown parameter '{}'", param.name),
                ));
            }
        }
        config.validate()?;

        let mut sources = ast
            .nodes
            .iter()
            .filter(|def| def.node_type == NodeType::Source);
        let source = sources.next().ok_or(GridError::MissingSource)?;
        if let Some(extra) = sources.next() {
            return Err(GridError::DuplicateSource {
                existing: source.name.clone(),
                name: extra.name.clone(),
            });
        }

        let mut grid = Grid::new(source.name.clone());
        grid.nodes[0].position = source.position();

        for def in &ast.nodes {
            if def.node_type == NodeType::Source {
                continue;
            }
            let kind = NodeKind::from_def(def, &config)?;
            grid.add_node(def.name.clone(), kind, def.position())?;
        }

        for wire in &ast.wires {
            let a = grid.require(&wire.a)?;
            let b = grid.require(&wire.b)?;
            grid.add_wire(a, b)?;
        }

        Ok((grid, config))
    }

    /// Add a node of any non-source kind.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        position: Position,
    ) -> Result<NodeId> {
        let name = name.into();
        if matches!(kind, NodeKind::Source) {
            return Err(GridError::DuplicateSource {
                existing: self.nodes[0].name.clone(),
                name,
            });
        }
        if self.node_map.contains_key(&name) {
            return Err(GridError::DuplicateNode { name });
        }
        validate_kind(&name, &kind)?;

        let id = NodeId(self.nodes.len());
        self.node_map.insert(name.clone(), id);
        self.nodes.push(Node {
            id,
            name,
            kind,
            position,
        });
        Ok(id)
    }

    /// Add a house load.
    pub fn add_house(&mut self, name: impl Into<String>, position: Position) -> Result<NodeId> {
        self.add_node(name, NodeKind::House, position)
    }

    /// Add an LED load.
    pub fn add_led(&mut self, name: impl Into<String>, position: Position) -> Result<NodeId> {
        self.add_node(name, NodeKind::Led, position)
    }

    /// Add an inline resistor.
    pub fn add_resistor(
        &mut self,
        name: impl Into<String>,
        ohms: f64,
        position: Position,
    ) -> Result<NodeId> {
        self.add_node(name, NodeKind::Resistor(Resistor::new(ohms)), position)
    }

    /// Add a transistor switch.
    pub fn add_transistor(
        &mut self,
        name: impl Into<String>,
        on: bool,
        position: Position,
    ) -> Result<NodeId> {
        self.add_node(name, NodeKind::Transistor(Switch::new(on)), position)
    }

    /// Add a capacitor. `farads` is nominal; it is multiplied by `time_scale`.
    pub fn add_capacitor(
        &mut self,
        name: impl Into<String>,
        farads: f64,
        time_scale: f64,
        position: Position,
    ) -> Result<NodeId> {
        let name = name.into();
        require_positive(&name, "capacitance", farads)?;
        self.add_node(
            name,
            NodeKind::Capacitor(Capacitor::from_nominal(farads, time_scale)),
            position,
        )
    }

    /// Add a voltage-ratio transformer.
    pub fn add_transformer(
        &mut self,
        name: impl Into<String>,
        ratio: f64,
        position: Position,
    ) -> Result<NodeId> {
        self.add_node(name, NodeKind::Transformer(Transformer::new(ratio)), position)
    }

    /// Connect two existing nodes.
    pub fn add_wire(&mut self, a: NodeId, b: NodeId) -> Result<WireKey> {
        let name_a = self.node(a).map(|n| n.name.clone()).ok_or_else(|| {
            GridError::NodeNotFound {
                node: a.to_string(),
            }
        })?;
        let name_b = self.node(b).map(|n| n.name.clone()).ok_or_else(|| {
            GridError::NodeNotFound {
                node: b.to_string(),
            }
        })?;
        if a == b {
            return Err(GridError::SelfLoop { node: name_a });
        }

        let key = WireKey::new(a, b);
        if !self.wired_pairs.insert(key) {
            return Err(GridError::DuplicateWire {
                a: name_a,
                b: name_b,
            });
        }
        self.wires.push(Wire::new(a, b));
        Ok(key)
    }

    /// Whether the unordered pair is already wired.
    pub fn is_wired(&self, a: NodeId, b: NodeId) -> bool {
        self.wired_pairs.contains(&WireKey::new(a, b))
    }

    /// Toggle a transistor, returning its new state.
    pub fn toggle_switch(&mut self, id: NodeId) -> Result<bool> {
        let switch = self.switch_mut(id)?;
        Ok(switch.toggle())
    }

    /// Set a transistor's state.
    pub fn set_switch(&mut self, id: NodeId, on: bool) -> Result<()> {
        self.switch_mut(id)?.set_state(on);
        Ok(())
    }

    fn switch_mut(&mut self, id: NodeId) -> Result<&mut Switch> {
        let node = self.nodes.get_mut(id.0).ok_or_else(|| GridError::NodeNotFound {
            node: id.to_string(),
        })?;
        match &mut node.kind {
            NodeKind::Transistor(s) => Ok(s),
            _ => Err(GridError::NotATransistor {
                node: node.name.clone(),
            }),
        }
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All nodes, mutably. Only per-node state may change; the arena itself
    /// cannot grow or shrink through this slice.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// All wires in insertion order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Number of nodes (including the source).
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Find a node ID by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_map.get(name).copied()
    }

    /// Find a node ID by name, failing with `NodeNotFound`.
    pub fn require(&self, name: &str) -> Result<NodeId> {
        self.find_node(name).ok_or_else(|| GridError::NodeNotFound {
            node: name.to_string(),
        })
    }

    /// Get the name of a node.
    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes.get(id.0).map(|n| n.name.as_str()).unwrap_or("?")
    }

    /// Name of the source node.
    pub fn source_name(&self) -> &str {
        &self.nodes[0].name
    }
}

/// Reject kind parameters the solver assumes are positive.
fn validate_kind(name: &str, kind: &NodeKind) -> Result<()> {
    match kind {
        NodeKind::Resistor(r) => require_positive(name, "ohms", r.ohms).map(|_| ()),
        NodeKind::Capacitor(c) => require_positive(name, "capacitance", c.capacitance).map(|_| ()),
        NodeKind::Transformer(x) => require_positive(name, "ratio", x.ratio).map(|_| ()),
        NodeKind::Source | NodeKind::House | NodeKind::Led | NodeKind::Transistor(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;

    #[test]
    fn test_source_is_node_zero() {
        let grid = Grid::new("GEN");
        assert_eq!(grid.find_node("GEN"), Some(NodeId::SOURCE));
        assert_eq!(grid.num_nodes(), 1);
        assert_eq!(grid.source_name(), "GEN");
    }

    #[test]
    fn test_rejects_duplicate_and_self_wires() {
        let mut grid = Grid::new("GEN");
        let h = grid.add_house("H1", Position::default()).unwrap();

        grid.add_wire(NodeId::SOURCE, h).unwrap();
        assert!(matches!(
            grid.add_wire(h, NodeId::SOURCE),
            Err(GridError::DuplicateWire { .. })
        ));
        assert!(matches!(
            grid.add_wire(h, h),
            Err(GridError::SelfLoop { .. })
        ));
        assert!(matches!(
            grid.add_wire(h, NodeId(42)),
            Err(GridError::NodeNotFound { .. })
        ));
        assert_eq!(grid.wires().len(), 1);
        assert!(grid.is_wired(h, NodeId::SOURCE));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut grid = Grid::new("GEN");
        let p = Position::default();
        assert!(grid.add_resistor("R1", 0.0, p).is_err());
        assert!(grid.add_transformer("X1", -0.5, p).is_err());
        assert!(grid.add_capacitor("C1", f64::NAN, 100.0, p).is_err());
        assert!(grid.add_node("GEN2", NodeKind::Source, p).is_err());
        // Rejected placements do not consume the name
        assert!(grid.add_resistor("R1", 2.0, p).is_ok());
        assert!(matches!(
            grid.add_led("R1", p),
            Err(GridError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn test_toggle_switch() {
        let mut grid = Grid::new("GEN");
        let t = grid.add_transistor("T1", true, Position::default()).unwrap();
        let h = grid.add_house("H1", Position::default()).unwrap();

        assert!(!grid.toggle_switch(t).unwrap());
        assert!(grid.node(t).unwrap().is_open_switch());
        grid.set_switch(t, true).unwrap();
        assert!(!grid.node(t).unwrap().is_open_switch());
        assert!(matches!(
            grid.toggle_switch(h),
            Err(GridError::NotATransistor { .. })
        ));
    }

    #[test]
    fn test_from_ast() {
        let text = "\
.param v=24
SRC GEN x=140 y=285
HOUSE H1
RES R1 2
WIRE GEN R1
WIRE R1 H1
";
        let ast = dsl::parse(text).unwrap();
        let (grid, config) = Grid::from_ast(&ast, &GridConfig::default()).unwrap();
        assert_eq!(config.source_voltage, 24.0);
        assert_eq!(grid.num_nodes(), 3);
        assert_eq!(grid.wires().len(), 2);
        assert_eq!(grid.node(NodeId::SOURCE).unwrap().position, Position::new(140.0, 285.0));
    }

    #[test]
    fn test_from_ast_requires_one_source() {
        let ast = dsl::parse("HOUSE H1\n").unwrap();
        assert!(matches!(
            Grid::from_ast(&ast, &GridConfig::default()),
            Err(GridError::MissingSource)
        ));

        let ast = dsl::parse("SRC A\nSRC B\n").unwrap();
        assert!(matches!(
            Grid::from_ast(&ast, &GridConfig::default()),
            Err(GridError::DuplicateSource { .. })
        ));
    }

    #[test]
    fn test_from_ast_unknown_wire_endpoint() {
        let ast = dsl::parse("SRC GEN\nWIRE GEN H9\n").unwrap();
        assert!(matches!(
            Grid::from_ast(&ast, &GridConfig::default()),
            Err(GridError::NodeNotFound { .. })
        ));
    }
}
