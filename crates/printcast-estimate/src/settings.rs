//! Print settings and speed profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// Print parameters supplied by the user.
///
/// Temperatures, `support_material` and `raft_enabled` are carried for the
/// host application; the time model does not read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSettings {
    /// Layer height (mm).
    pub layer_height: f64,
    /// Infill density (percent, 0 to 100).
    pub infill_density: f64,
    /// Inner wall / general print speed (mm/s).
    pub print_speed: f64,
    /// Outer wall speed (mm/s).
    pub outer_wall_speed: f64,
    /// Infill speed (mm/s).
    pub infill_speed: f64,
    /// Travel speed (mm/s).
    pub travel_speed: f64,
    /// Nozzle temperature (°C).
    pub print_temperature: f64,
    /// Bed temperature (°C).
    pub bed_temperature: f64,
    /// Generate support structures.
    pub support_material: bool,
    /// Print on a raft.
    pub raft_enabled: bool,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            infill_density: 20.0,
            print_speed: 150.0,
            outer_wall_speed: 25.0,
            infill_speed: 200.0,
            travel_speed: 300.0,
            print_temperature: 210.0,
            bed_temperature: 60.0,
            support_material: false,
            raft_enabled: false,
            nozzle_diameter: 0.4,
        }
    }
}

impl PrintSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        positive("layerHeight", self.layer_height)?;
        if !(0.0..=100.0).contains(&self.infill_density) {
            return Err(EstimateError::settings(
                "infillDensity",
                "must be between 0 and 100",
            ));
        }
        positive("printSpeed", self.print_speed)?;
        positive("outerWallSpeed", self.outer_wall_speed)?;
        positive("infillSpeed", self.infill_speed)?;
        positive("travelSpeed", self.travel_speed)?;
        positive("nozzleDiameter", self.nozzle_diameter)?;
        Ok(())
    }

    /// Copy of these settings with the speeds of `profile`.
    pub fn with_speed_profile(&self, profile: SpeedProfile) -> Self {
        let speeds = profile.speeds();
        Self {
            outer_wall_speed: speeds.outer,
            print_speed: speeds.inner,
            infill_speed: speeds.infill,
            travel_speed: speeds.travel,
            ..self.clone()
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EstimateError::settings(field, "must be a positive number"))
    }
}

/// Named speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedProfile {
    /// Quiet, slow moves.
    Silent,
    /// Balanced default.
    #[default]
    Standard,
    /// Faster moves.
    Sport,
    /// Fastest preset.
    Turbo,
}

/// Speeds of one preset (mm/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSet {
    /// Outer wall.
    pub outer: f64,
    /// Inner walls.
    pub inner: f64,
    /// Infill.
    pub infill: f64,
    /// Travel.
    pub travel: f64,
}

impl SpeedProfile {
    /// All presets, slowest first.
    pub const ALL: [SpeedProfile; 4] = [Self::Silent, Self::Standard, Self::Sport, Self::Turbo];

    /// Speeds for this preset.
    pub fn speeds(self) -> SpeedSet {
        let (outer, inner, infill, travel) = match self {
            Self::Silent => (30.0, 60.0, 80.0, 150.0),
            Self::Standard => (50.0, 100.0, 150.0, 250.0),
            Self::Sport => (80.0, 150.0, 200.0, 300.0),
            Self::Turbo => (100.0, 200.0, 250.0, 350.0),
        };
        SpeedSet {
            outer,
            inner,
            infill,
            travel,
        }
    }

    /// Lowercase preset name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Standard => "standard",
            Self::Sport => "sport",
            Self::Turbo => "turbo",
        }
    }
}

impl fmt::Display for SpeedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpeedProfile {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EstimateError::UnknownProfile(s.to_string()))
    }
}
