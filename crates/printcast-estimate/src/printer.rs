//! Printer profile definitions.

use printcast_mesh::Aabb;
use printcast_units::Filament;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::settings::PrintSettings;

/// Printer profile with machine-specific limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterProfile {
    /// Profile name.
    pub name: String,
    /// Build volume X (mm).
    pub bed_x: f64,
    /// Build volume Y (mm).
    pub bed_y: f64,
    /// Build volume Z (mm).
    pub bed_z: f64,
    /// Maximum toolhead speed (mm/s).
    pub max_speed: f64,
    /// Maximum acceleration (mm/s²).
    pub max_acceleration: f64,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
    /// Filament diameter (mm).
    pub filament_diameter: f64,
    /// Default print temperature (°C).
    pub default_print_temp: u32,
    /// Default bed temperature (°C).
    pub default_bed_temp: u32,
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::generic()
    }
}

impl PrinterProfile {
    /// Generic printer profile.
    pub fn generic() -> Self {
        Self {
            name: "Generic".into(),
            bed_x: 220.0,
            bed_y: 220.0,
            bed_z: 250.0,
            max_speed: 300.0,
            max_acceleration: 3000.0,
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            default_print_temp: 210,
            default_bed_temp: 60,
        }
    }

    /// Bambu Lab A1 profile.
    pub fn bambu_a1() -> Self {
        Self {
            name: "Bambu Lab A1".into(),
            bed_x: 256.0,
            bed_y: 256.0,
            bed_z: 256.0,
            max_speed: 500.0,
            max_acceleration: 10000.0,
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            default_print_temp: 220,
            default_bed_temp: 55,
        }
    }

    /// Creality Ender 3 profile.
    pub fn ender3() -> Self {
        Self {
            name: "Creality Ender 3".into(),
            bed_x: 220.0,
            bed_y: 220.0,
            bed_z: 250.0,
            max_speed: 200.0,
            max_acceleration: 500.0,
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            default_print_temp: 200,
            default_bed_temp: 60,
        }
    }

    /// Prusa MK4 profile.
    pub fn prusa_mk4() -> Self {
        Self {
            name: "Prusa MK4".into(),
            bed_x: 250.0,
            bed_y: 210.0,
            bed_z: 220.0,
            max_speed: 200.0,
            max_acceleration: 4000.0,
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            default_print_temp: 215,
            default_bed_temp: 60,
        }
    }

    /// Get all built-in profiles.
    pub fn all_profiles() -> Vec<Self> {
        vec![
            Self::generic(),
            Self::bambu_a1(),
            Self::ender3(),
            Self::prusa_mk4(),
        ]
    }

    /// Look up a built-in profile by [`id`](Self::id) or name, ignoring case.
    pub fn by_id(id: &str) -> Result<Self> {
        Self::all_profiles()
            .into_iter()
            .find(|p| p.id() == id.to_lowercase() || p.name.eq_ignore_ascii_case(id))
            .ok_or_else(|| EstimateError::UnknownProfile(id.to_string()))
    }

    /// Identifier derived from the name, e.g. `bambu_lab_a1`.
    pub fn id(&self) -> String {
        self.name
            .to_lowercase()
            .replace(' ', "_")
            .replace(['(', ')'], "")
    }

    /// Filament loaded on this printer (PLA density).
    pub fn filament(&self) -> Filament {
        Filament {
            diameter: self.filament_diameter,
            ..Filament::pla()
        }
    }

    /// Default print settings for this machine.
    pub fn default_settings(&self) -> PrintSettings {
        PrintSettings {
            nozzle_diameter: self.nozzle_diameter,
            print_temperature: f64::from(self.default_print_temp),
            bed_temperature: f64::from(self.default_bed_temp),
            ..Default::default()
        }
    }

    /// Check if a position is within build volume.
    pub fn in_bounds(&self, x: f64, y: f64, z: f64) -> bool {
        x >= 0.0 && x <= self.bed_x && y >= 0.0 && y <= self.bed_y && z >= 0.0 && z <= self.bed_z
    }

    /// Check if a model of these bounds fits the build volume once placed
    /// on the bed.
    pub fn fits(&self, bounds: &Aabb) -> bool {
        let size = bounds.size();
        size.x <= self.bed_x && size.y <= self.bed_y && size.z <= self.bed_z
    }
}
