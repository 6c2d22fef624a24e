//! Constants of the simplified time and material model.

use printcast_units::Filament;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// Tunable constants of the bounding-box estimator.
///
/// The default models PLA on a stock 1.75 mm printer; alternate materials
/// or printers can be modeled by adjusting these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatorModel {
    /// Filament fed into the extruder.
    pub filament: Filament,
    /// Fixed per-job time for heating and homing (s).
    pub overhead_seconds: f64,
    /// Travel distance per layer as a fraction of the perimeter.
    pub travel_fraction: f64,
    /// Extrusion width as a multiple of the nozzle diameter.
    pub extrusion_width_factor: f64,
}

impl Default for EstimatorModel {
    fn default() -> Self {
        Self {
            filament: Filament::pla(),
            overhead_seconds: 300.0,
            travel_fraction: 0.3,
            extrusion_width_factor: 1.2,
        }
    }
}

impl EstimatorModel {
    /// Validate model constants.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.filament.invalid_field() {
            return Err(EstimateError::InvalidModel(format!("{name} out of range")));
        }
        let checks = [
            ("overhead", self.overhead_seconds >= 0.0),
            ("travel fraction", self.travel_fraction >= 0.0),
            ("extrusion width factor", self.extrusion_width_factor > 0.0),
        ];
        for (name, ok) in checks {
            if !ok {
                return Err(EstimateError::InvalidModel(format!("{name} out of range")));
            }
        }
        Ok(())
    }
}
