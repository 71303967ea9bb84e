//! Electrical constants for a grid session.
//!
//! Every number the solver consults lives in [`GridConfig`]. Defaults match the
//! town builder's original tuning: a 12 V generator, near-lossless wires, and
//! loads whose thresholds make a direct connection read as fully ON.

use serde::{Deserialize, Deserializer, Serialize};

use crate::components::LoadKind;
use crate::error::{GridError, Result};

/// Ground resistance and ON/DIM thresholds for one load type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadProfile {
    /// Fixed resistance from the load node to ground (ohms).
    pub ground_resistance: f64,
    /// Voltage at or above which the load is fully ON.
    pub v_on: f64,
    /// Voltage at or above which the load is DIM (below `v_on`).
    pub v_dim: f64,
}

impl LoadProfile {
    /// Default house profile: 18 Ω, ON at 9 V, DIM at 7 V.
    pub const HOUSE: LoadProfile = LoadProfile {
        ground_resistance: 18.0,
        v_on: 9.0,
        v_dim: 7.0,
    };

    /// Default LED street light profile: 30 Ω, ON at 3 V, DIM at 2.2 V.
    pub const LED: LoadProfile = LoadProfile {
        ground_resistance: 30.0,
        v_on: 3.0,
        v_dim: 2.2,
    };

    /// Conductance of the to-ground resistance.
    pub fn ground_conductance(&self) -> f64 {
        1.0 / self.ground_resistance
    }

    fn validate(&self, label: &str) -> Result<()> {
        if !(self.ground_resistance > 0.0) {
            return Err(GridError::invalid_config(format!(
                "{} ground resistance must be positive, got {}",
                label, self.ground_resistance
            )));
        }
        if !(self.v_dim >= 0.0) || !(self.v_on >= self.v_dim) {
            return Err(GridError::invalid_config(format!(
                "{} thresholds must satisfy 0 <= dim <= on, got dim={} on={}",
                label, self.v_dim, self.v_on
            )));
        }
        Ok(())
    }
}

/// Keys given for a load profile in a config file. Missing keys keep the
/// built-in profile's value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileOverride {
    ground_resistance: Option<f64>,
    v_on: Option<f64>,
    v_dim: Option<f64>,
}

impl ProfileOverride {
    fn apply(self, base: LoadProfile) -> LoadProfile {
        LoadProfile {
            ground_resistance: self.ground_resistance.unwrap_or(base.ground_resistance),
            v_on: self.v_on.unwrap_or(base.v_on),
            v_dim: self.v_dim.unwrap_or(base.v_dim),
        }
    }
}

fn house_profile<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<LoadProfile, D::Error> {
    ProfileOverride::deserialize(d).map(|o| o.apply(LoadProfile::HOUSE))
}

fn led_profile<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<LoadProfile, D::Error> {
    ProfileOverride::deserialize(d).map(|o| o.apply(LoadProfile::LED))
}

/// Configuration for a grid session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Generator voltage (volts).
    pub source_voltage: f64,
    /// Base resistance of every wire (ohms).
    pub wire_resistance: f64,
    /// Resistance a closed transistor adds to each incident wire (ohms).
    pub switch_on_resistance: f64,
    /// House load profile.
    #[serde(deserialize_with = "house_profile")]
    pub house: LoadProfile,
    /// LED load profile.
    #[serde(deserialize_with = "led_profile")]
    pub led: LoadProfile,
    /// Capacitor slow-down factor `s`, clamped to `[0.001, 1.0]` at use.
    pub capacitor_slow_factor: f64,
    /// Multiplier applied to nominal farads when a capacitor is placed, so
    /// charge curves span seconds rather than microseconds.
    pub capacitor_time_scale: f64,
    /// Tick length used when a re-solve is triggered by an edit (seconds).
    pub default_dt: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            source_voltage: 12.0,
            wire_resistance: 0.03,
            switch_on_resistance: 0.5,
            house: LoadProfile::HOUSE,
            led: LoadProfile::LED,
            capacitor_slow_factor: 0.04,
            capacitor_time_scale: 100.0,
            default_dt: 1.0 / 60.0,
        }
    }
}

impl GridConfig {
    /// Smallest slow-down factor honoured by the capacitor model.
    pub const MIN_SLOW_FACTOR: f64 = 0.001;

    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a (possibly partial) JSON configuration and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and decode a JSON configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GridError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Set the generator voltage.
    pub fn with_source_voltage(mut self, volts: f64) -> Self {
        self.source_voltage = volts;
        self
    }

    /// Set the base wire resistance.
    pub fn with_wire_resistance(mut self, ohms: f64) -> Self {
        self.wire_resistance = ohms;
        self
    }

    /// Set the closed-transistor resistance.
    pub fn with_switch_on_resistance(mut self, ohms: f64) -> Self {
        self.switch_on_resistance = ohms;
        self
    }

    /// Set the capacitor slow-down factor.
    ///
    /// Smaller values make capacitors charge more slowly:
    /// - 0.04 (default): a 220 µF part takes a few seconds to settle
    /// - 0.2: roughly five times faster
    pub fn with_capacitor_slow_factor(mut self, factor: f64) -> Self {
        self.capacitor_slow_factor = factor;
        self
    }

    /// Set the capacitor time-scale multiplier.
    pub fn with_capacitor_time_scale(mut self, scale: f64) -> Self {
        self.capacitor_time_scale = scale;
        self
    }

    /// Set the tick length used for edit-triggered solves.
    pub fn with_default_dt(mut self, dt: f64) -> Self {
        self.default_dt = dt;
        self
    }

    /// Load profile for the given load kind.
    pub fn profile(&self, kind: LoadKind) -> &LoadProfile {
        match kind {
            LoadKind::House => &self.house,
            LoadKind::Led => &self.led,
        }
    }

    /// Slow-down factor clamped to the supported range.
    pub fn effective_slow_factor(&self) -> f64 {
        self.capacitor_slow_factor.clamp(Self::MIN_SLOW_FACTOR, 1.0)
    }

    /// Apply a named override, as used by `.param` lines in grid files.
    ///
    /// Returns `false` when the key is not recognised.
    pub fn set_param(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            "source_voltage" | "v" => &mut self.source_voltage,
            "wire_resistance" | "r_wire" => &mut self.wire_resistance,
            "switch_on_resistance" | "r_switch" => &mut self.switch_on_resistance,
            "house_resistance" | "r_house" => &mut self.house.ground_resistance,
            "house_on" | "v_house_on" => &mut self.house.v_on,
            "house_dim" | "v_house_dim" => &mut self.house.v_dim,
            "led_resistance" | "r_led" => &mut self.led.ground_resistance,
            "led_on" | "v_led_on" => &mut self.led.v_on,
            "led_dim" | "v_led_dim" => &mut self.led.v_dim,
            "capacitor_slow_factor" | "cap_slow" => &mut self.capacitor_slow_factor,
            "capacitor_time_scale" | "cap_scale" => &mut self.capacitor_time_scale,
            "default_dt" | "dt" => &mut self.default_dt,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Check every constant is in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("source voltage", self.source_voltage),
            ("wire resistance", self.wire_resistance),
            ("capacitor time scale", self.capacitor_time_scale),
        ];
        for (label, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(GridError::invalid_config(format!(
                    "{} must be positive, got {}",
                    label, value
                )));
            }
        }

        if !(self.switch_on_resistance >= 0.0) {
            return Err(GridError::invalid_config(format!(
                "switch on-resistance must be non-negative, got {}",
                self.switch_on_resistance
            )));
        }

        if !(self.capacitor_slow_factor > 0.0 && self.capacitor_slow_factor <= 1.0) {
            return Err(GridError::invalid_config(format!(
                "capacitor slow factor must be in (0, 1], got {}",
                self.capacitor_slow_factor
            )));
        }

        if !(self.default_dt >= 0.0) {
            return Err(GridError::invalid_config(format!(
                "default dt must be non-negative, got {}",
                self.default_dt
            )));
        }

        self.house.validate("house")?;
        self.led.validate("LED")?;
        Ok(())
    }
}
