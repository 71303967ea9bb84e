//! Loads: houses and LED street lights.

use std::fmt;

use serde::Serialize;

use crate::config::LoadProfile;

/// The two load types. Both are a fixed resistance from the node to ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoadKind {
    House,
    Led,
}

/// Brightness classification of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadLevel {
    Off,
    Dim,
    On,
}

impl LoadLevel {
    /// Classify a solved voltage against a load profile.
    pub fn classify(voltage: f64, profile: &LoadProfile) -> Self {
        if voltage >= profile.v_on {
            LoadLevel::On
        } else if voltage >= profile.v_dim {
            LoadLevel::Dim
        } else {
            LoadLevel::Off
        }
    }
}

impl fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadLevel::Off => "OFF",
            LoadLevel::Dim => "DIM",
            LoadLevel::On => "ON",
        };
        f.pad(s)
    }
}

/// Solved readout for one load node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadReading {
    pub kind: LoadKind,
    pub voltage: f64,
    pub current: f64,
    pub level: LoadLevel,
    /// `voltage / v_on` clamped to `[0, 1]`, for proportional glow.
    pub brightness: f64,
}

impl LoadReading {
    /// Reading for a load the generator cannot reach.
    pub fn unpowered(kind: LoadKind) -> Self {
        Self {
            kind,
            voltage: 0.0,
            current: 0.0,
            level: LoadLevel::Off,
            brightness: 0.0,
        }
    }

    /// Reading for a reachable load at the given solved voltage.
    pub fn powered(kind: LoadKind, voltage: f64, profile: &LoadProfile) -> Self {
        let brightness = if profile.v_on > 0.0 {
            (voltage / profile.v_on).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            kind,
            voltage,
            current: voltage / profile.ground_resistance,
            level: LoadLevel::classify(voltage, profile),
            brightness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_house_thresholds() {
        let p = LoadProfile::HOUSE;
        assert_eq!(LoadLevel::classify(9.0, &p), LoadLevel::On);
        assert_eq!(LoadLevel::classify(8.99, &p), LoadLevel::Dim);
        assert_eq!(LoadLevel::classify(7.0, &p), LoadLevel::Dim);
        assert_eq!(LoadLevel::classify(6.99, &p), LoadLevel::Off);
    }

    #[test]
    fn test_led_thresholds_differ_from_house() {
        assert_eq!(LoadLevel::classify(3.0, &LoadProfile::LED), LoadLevel::On);
        assert_eq!(LoadLevel::classify(3.0, &LoadProfile::HOUSE), LoadLevel::Off);
        assert_eq!(LoadLevel::classify(2.5, &LoadProfile::LED), LoadLevel::Dim);
    }

    #[test]
    fn test_powered_reading() {
        let r = LoadReading::powered(LoadKind::Led, 1.5, &LoadProfile::LED);
        assert_relative_eq!(r.current, 0.05);
        assert_relative_eq!(r.brightness, 0.5);
        assert_eq!(r.level, LoadLevel::Off);

        let r = LoadReading::powered(LoadKind::Led, 12.0, &LoadProfile::LED);
        assert_relative_eq!(r.brightness, 1.0);
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_string(&LoadLevel::Dim).unwrap();
        assert_eq!(json, "\"DIM\"");
    }
}
