#![warn(missing_docs)]

//! Shared units and filament constants for printcast.
//!
//! Both the mesh-based estimator and the G-code analyzer report material
//! consumption in the same shape. This crate owns that shape along with the
//! filament parameters used to derive it, so neither side hard-codes
//! physical constants.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cubic millimeters per cubic centimeter.
pub const MM3_PER_CM3: f64 = 1000.0;

/// Millimeters per meter.
pub const MM_PER_M: f64 = 1000.0;

/// Convert a volume from mm³ to cm³.
pub fn mm3_to_cm3(volume_mm3: f64) -> f64 {
    volume_mm3 / MM3_PER_CM3
}

/// Convert a length from mm to m.
pub fn mm_to_m(length_mm: f64) -> f64 {
    length_mm / MM_PER_M
}

/// Filament stock fed into the extruder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filament {
    /// Filament diameter (mm).
    pub diameter: f64,
    /// Material density (g/mm³).
    pub density: f64,
}

impl Default for Filament {
    fn default() -> Self {
        Self::pla()
    }
}

impl Filament {
    /// 1.75 mm PLA at 1.24 g/cm³.
    pub const fn pla() -> Self {
        Self {
            diameter: 1.75,
            density: 0.00124,
        }
    }

    /// Name of the first out-of-range field, if any. The diameter must be
    /// finite and positive, the density finite and non-negative.
    pub fn invalid_field(&self) -> Option<&'static str> {
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            Some("filament diameter")
        } else if !(self.density.is_finite() && self.density >= 0.0) {
            Some("filament density")
        } else {
            None
        }
    }

    /// Cross-section area of the filament strand (mm²).
    pub fn cross_section(&self) -> f64 {
        PI * (self.diameter / 2.0).powi(2)
    }

    /// Material usage for an extruded volume given in mm³.
    pub fn usage_from_volume(&self, volume_mm3: f64) -> MaterialUsage {
        MaterialUsage {
            length: mm_to_m(volume_mm3 / self.cross_section()),
            weight: volume_mm3 * self.density,
            volume: mm3_to_cm3(volume_mm3),
        }
    }

    /// Material usage for a length of raw filament given in mm.
    pub fn usage_from_length(&self, length_mm: f64) -> MaterialUsage {
        let volume_mm3 = length_mm * self.cross_section();
        MaterialUsage {
            length: mm_to_m(length_mm),
            weight: volume_mm3 * self.density,
            volume: mm3_to_cm3(volume_mm3),
        }
    }

    /// Weight in grams of a solid volume given in mm³.
    pub fn weight_of(&self, volume_mm3: f64) -> f64 {
        volume_mm3 * self.density
    }
}

/// Filament consumed by a print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    /// Filament length (m).
    pub length: f64,
    /// Filament weight (g).
    pub weight: f64,
    /// Extruded volume (cm³).
    pub volume: f64,
}

/// Format a duration in seconds for display, e.g. `2h 05m` or `4m 10s`.
///
/// Negative and non-finite inputs format as `0s`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0s".into();
    }
    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
