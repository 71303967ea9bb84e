//! Simulation output for the CLI frontend.
//!
//! Writes grid snapshots either as a plain-text table or as one JSON object
//! per line, and drives a scripted run of the simulator.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use crate::components::{LoadKind, LoadReading};
use crate::error::{GridError, Result};
use crate::solver::Simulator;

/// A serializable, name-keyed view of the simulator's current state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub time: f64,
    pub degenerate: bool,
    pub voltages: BTreeMap<&'a str, f64>,
    pub loads: BTreeMap<&'a str, LoadReading>,
    pub wires: Vec<WireView<'a>>,
}

/// One wire's metrics, with endpoints by name.
#[derive(Debug, Clone, Serialize)]
pub struct WireView<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub resistance: f64,
    pub voltage_drop: f64,
    pub current: f64,
}

impl<'a> Snapshot<'a> {
    pub fn capture(sim: &'a Simulator) -> Self {
        let grid = sim.grid();
        let state = sim.state();
        Self {
            tick: sim.ticks(),
            time: sim.elapsed(),
            degenerate: state.degenerate,
            voltages: state
                .voltages
                .iter()
                .map(|(id, v)| (grid.node_name(*id), *v))
                .collect(),
            loads: state
                .loads
                .iter()
                .map(|(id, reading)| (grid.node_name(*id), *reading))
                .collect(),
            wires: state
                .wires
                .values()
                .map(|m| WireView {
                    from: grid.node_name(m.from),
                    to: grid.node_name(m.to),
                    resistance: m.resistance,
                    voltage_drop: m.voltage_drop,
                    current: m.current,
                })
                .collect(),
        }
    }
}

/// How many houses the generator reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HouseCheck {
    pub connected: usize,
    pub total: usize,
}

impl HouseCheck {
    pub fn run(sim: &Simulator) -> Self {
        let state = sim.state();
        let houses = state
            .loads
            .iter()
            .filter(|(_, r)| r.kind == LoadKind::House);
        let (connected, total) = houses.fold((0, 0), |(c, t), (id, _)| {
            (c + usize::from(state.is_reachable(*id)), t + 1)
        });
        Self { connected, total }
    }

    pub fn passed(&self) -> bool {
        self.connected == self.total
    }
}

impl fmt::Display for HouseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(f, "All houses powered! Nice work.")
        } else {
            write!(f, "Only {}/{} houses connected.", self.connected, self.total)
        }
    }
}

/// Sink for simulator snapshots.
pub trait ReportWriter {
    /// Write the simulator's current state.
    fn write_state(&mut self, sim: &Simulator) -> Result<()>;

    /// Write the closing house check and flush.
    fn finish(&mut self, sim: &Simulator) -> Result<()>;
}

fn output_error(e: impl fmt::Display) -> GridError {
    GridError::OutputError {
        message: e.to_string(),
    }
}

/// Human-readable load table.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportWriter for TextReport<W> {
    fn write_state(&mut self, sim: &Simulator) -> Result<()> {
        let grid = sim.grid();
        let state = sim.state();

        writeln!(self.out, "tick {}  t={:.3}s", sim.ticks(), sim.elapsed()).map_err(output_error)?;
        if state.degenerate {
            writeln!(self.out, "  (singular system, grid de-energized)").map_err(output_error)?;
        }
        writeln!(
            self.out,
            "  {:<10} {:<6} {:>9} {:>9} {:>6}",
            "NODE", "KIND", "VOLTS", "AMPS", "LEVEL"
        )
        .map_err(output_error)?;

        for (id, reading) in &state.loads {
            let kind = grid.node(*id).map_or("?", |n| n.kind.tag());
            writeln!(
                self.out,
                "  {:<10} {:<6} {:>9.3} {:>9.4} {:>6}",
                grid.node_name(*id),
                kind,
                reading.voltage,
                reading.current,
                reading.level
            )
            .map_err(output_error)?;
        }
        Ok(())
    }

    fn finish(&mut self, sim: &Simulator) -> Result<()> {
        writeln!(self.out, "{}", HouseCheck::run(sim)).map_err(output_error)?;
        self.out.flush().map_err(output_error)
    }
}

/// One JSON object per snapshot, newline separated.
pub struct JsonLinesReport<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportWriter for JsonLinesReport<W> {
    fn write_state(&mut self, sim: &Simulator) -> Result<()> {
        serde_json::to_writer(&mut self.out, &Snapshot::capture(sim)).map_err(output_error)?;
        writeln!(self.out).map_err(output_error)
    }

    fn finish(&mut self, sim: &Simulator) -> Result<()> {
        #[derive(Serialize)]
        struct Check {
            check: HouseCheck,
        }
        serde_json::to_writer(&mut self.out, &Check { check: HouseCheck::run(sim) })
            .map_err(output_error)?;
        writeln!(self.out).map_err(output_error)?;
        self.out.flush().map_err(output_error)
    }
}

/// A scripted run: tick count, tick length, reporting interval and
/// transistor flips.
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub ticks: u64,
    pub dt: f64,
    /// Report every N ticks; 0 reports only the initial and final state
    pub every: u64,
    /// `(tick, transistor name)`: flip before solving that tick
    pub toggles: Vec<(u64, String)>,
}

/// Run `plan` on `sim`, writing snapshots to `writer`.
///
/// A toggle scheduled past the last tick is an error.
pub fn run_plan(sim: &mut Simulator, plan: &RunPlan, writer: &mut dyn ReportWriter) -> Result<()> {
    if let Some((at, name)) = plan.toggles.iter().find(|(at, _)| *at > plan.ticks) {
        return Err(GridError::invalid_config(format!(
            "toggle {}@{} is after the last tick ({})",
            name, at, plan.ticks
        )));
    }

    writer.write_state(sim)?;

    for tick in 1..=plan.ticks {
        for (_, name) in plan.toggles.iter().filter(|(at, _)| *at == tick) {
            let on = sim.toggle_switch(name)?;
            info!(tick, node = name.as_str(), on, "scheduled toggle");
        }
        sim.step(plan.dt);
        if sim.state().degenerate {
            warn!(tick, "grid matrix singular");
        }

        let due = plan.every > 0 && tick % plan.every == 0;
        if due || tick == plan.ticks {
            writer.write_state(sim)?;
        }
    }

    writer.finish(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    const TOWN: &str = "\
SRC GEN
TRANS T1
HOUSE H1
HOUSE H2
LED L1
WIRE GEN T1
WIRE T1 H1
WIRE GEN L1
";

    fn sim() -> Simulator {
        Simulator::from_source(TOWN, &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_house_check() {
        let mut s = sim();
        let check = HouseCheck::run(&s);
        assert_eq!(check, HouseCheck { connected: 1, total: 2 });
        assert_eq!(check.to_string(), "Only 1/2 houses connected.");

        s.connect("L1", "H2").unwrap();
        let check = HouseCheck::run(&s);
        assert!(check.passed());
        assert_eq!(check.to_string(), "All houses powered! Nice work.");
    }

    #[test]
    fn test_house_check_without_houses() {
        let s = Simulator::from_source("SRC GEN\nLED L1\nWIRE GEN L1\n", &GridConfig::default())
            .unwrap();
        let check = HouseCheck::run(&s);
        assert_eq!(check, HouseCheck { connected: 0, total: 0 });
        assert_eq!(check.to_string(), "All houses powered! Nice work.");
    }

    #[test]
    fn test_text_report() {
        let s = sim();
        let mut report = TextReport::new(Vec::new());
        report.write_state(&s).unwrap();
        report.finish(&s).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();

        assert!(text.starts_with("tick 0"));
        let h1 = text.lines().find(|l| l.trim_start().starts_with("H1")).unwrap();
        assert!(h1.contains("HOUSE"));
        assert!(h1.ends_with("ON"));
        let h2 = text.lines().find(|l| l.trim_start().starts_with("H2")).unwrap();
        assert!(h2.ends_with("OFF"));
        let l1 = text.lines().find(|l| l.trim_start().starts_with("L1")).unwrap();
        assert!(l1.contains("LED"));
        assert!(text.ends_with("Only 1/2 houses connected.\n"));
    }

    #[test]
    fn test_json_lines_with_plan() {
        let mut s = sim();
        let plan = RunPlan {
            ticks: 4,
            dt: 1.0 / 60.0,
            every: 2,
            toggles: vec![(3, "T1".to_string())],
        };
        let mut report = JsonLinesReport::new(Vec::new());
        run_plan(&mut s, &plan, &mut report).unwrap();

        let text = String::from_utf8(report.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        // ticks 0, 2, 4 plus the closing check
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["tick"], 0);
        assert_eq!(lines[1]["loads"]["H1"]["level"], "ON");
        assert_eq!(lines[2]["tick"], 4);
        assert_eq!(lines[2]["loads"]["H1"]["level"], "OFF");
        assert_eq!(lines[2]["voltages"]["GEN"], 12.0);
        assert_eq!(lines[3]["check"]["connected"], 0);
    }

    #[test]
    fn test_demo_town() {
        let mut s = Simulator::from_source(include_str!("../../demos/town.grid"), &GridConfig::default())
            .unwrap();
        s.run(120, 1.0 / 60.0);
        assert_eq!(HouseCheck::run(&s).to_string(), "Only 2/3 houses connected.");
        assert_eq!(s.node_voltage("X1"), Some(6.0));
        assert_eq!(s.load("L1").unwrap().level, crate::components::LoadLevel::On);
    }

    #[test]
    fn test_plan_rejects_unknown_toggle() {
        let mut s = sim();
        let plan = RunPlan {
            ticks: 1,
            dt: 0.1,
            every: 0,
            toggles: vec![(1, "NOPE".to_string())],
        };
        let mut report = TextReport::new(Vec::new());
        assert!(matches!(
            run_plan(&mut s, &plan, &mut report),
            Err(GridError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_toggle_after_last_tick() {
        let mut s = sim();
        let plan = RunPlan {
            ticks: 10,
            dt: 0.1,
            every: 0,
            toggles: vec![(11, "T1".to_string())],
        };
        let mut report = TextReport::new(Vec::new());
        assert!(matches!(
            run_plan(&mut s, &plan, &mut report),
            Err(GridError::InvalidConfig { .. })
        ));
        assert!(report.into_inner().is_empty());
        assert_eq!(s.ticks(), 0);
    }
}
