//! Bounding-box print-time and material estimate.
//!
//! The model treats the footprint of the axis-aligned bounding box as the
//! cross-section of every layer. No slicing happens: walls follow the box
//! perimeter, infill covers the box area scaled by density, and travel is a
//! fixed fraction of the perimeter.

use log::debug;
use printcast_mesh::{Aabb, TriangleMesh};
use printcast_units::MaterialUsage;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::model::EstimatorModel;
use crate::settings::PrintSettings;

/// Estimated print time and material for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintEstimate {
    /// Total print time (s).
    pub total_time: f64,
    /// Number of layers.
    pub layers: u32,
    /// Filament consumed.
    pub material_used: MaterialUsage,
    /// Time split by activity; sums to `total_time`.
    pub breakdown: TimeBreakdown,
}

/// Print time split by activity (s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBreakdown {
    /// Outer wall extrusion over all layers.
    pub outer_walls: f64,
    /// Infill extrusion over all layers.
    pub infill: f64,
    /// Travel moves over all layers.
    pub travel: f64,
    /// Fixed heating and homing time.
    pub overhead: f64,
}

impl TimeBreakdown {
    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.outer_walls + self.infill + self.travel + self.overhead
    }
}

/// Print-time estimator with injected model constants.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    model: EstimatorModel,
}

impl Estimator {
    /// Create an estimator, rejecting non-physical model constants.
    pub fn new(model: EstimatorModel) -> Result<Self> {
        model.validate()?;
        Ok(Self { model })
    }

    /// Model constants in use.
    pub fn model(&self) -> &EstimatorModel {
        &self.model
    }

    /// Estimate a mesh. Returns `Ok(None)` when the mesh has no vertices and
    /// therefore no bounding box.
    pub fn estimate(
        &self,
        mesh: &TriangleMesh,
        settings: &PrintSettings,
    ) -> Result<Option<PrintEstimate>> {
        settings.validate()?;
        match mesh.bounds() {
            Some(bounds) => self.estimate_bounds(&bounds, settings).map(Some),
            None => {
                debug!("mesh has no vertices, skipping estimate");
                Ok(None)
            }
        }
    }

    /// Estimate a model given only its bounding box.
    pub fn estimate_bounds(&self, bounds: &Aabb, settings: &PrintSettings) -> Result<PrintEstimate> {
        settings.validate()?;
        let size = bounds.size();
        let model = &self.model;

        // A box that is flat or inverted on any axis prints nothing.
        let degenerate = size.iter().any(|&s| !(s.is_finite() && s > 0.0));
        let (layers, width, depth) = if degenerate {
            (0u32, 0.0, 0.0)
        } else {
            (layer_count(size.z, settings.layer_height)?, size.x, size.y)
        };
        let n = f64::from(layers);

        let layer_area = width * depth;
        let perimeter = 2.0 * (width + depth);
        let infill_area = layer_area * (settings.infill_density / 100.0);

        let outer_wall_time = perimeter / settings.outer_wall_speed;
        let infill_time = infill_area / settings.infill_speed;
        let travel_time = perimeter * model.travel_fraction / settings.travel_speed;

        let breakdown = TimeBreakdown {
            outer_walls: outer_wall_time * n,
            infill: infill_time * n,
            travel: travel_time * n,
            overhead: model.overhead_seconds,
        };

        let extrusion_width = settings.nozzle_diameter * model.extrusion_width_factor;
        let wall_volume = perimeter * settings.layer_height * extrusion_width * n;
        let infill_volume = infill_area * settings.layer_height * n;
        let material_used = model.filament.usage_from_volume(wall_volume + infill_volume);

        let estimate = PrintEstimate {
            total_time: breakdown.total(),
            layers,
            material_used,
            breakdown,
        };
        debug!(
            "estimated {} layers, {:.0}s, {:.2}m filament for {:.1}x{:.1}x{:.1} mm box",
            estimate.layers,
            estimate.total_time,
            estimate.material_used.length,
            size.x,
            size.y,
            size.z
        );
        Ok(estimate)
    }
}

/// Layers needed to cover `height`, rejecting counts that do not fit a `u32`.
fn layer_count(height: f64, layer_height: f64) -> Result<u32> {
    let layers = (height / layer_height).ceil();
    if layers.is_finite() && layers <= f64::from(u32::MAX) {
        Ok(layers as u32)
    } else {
        Err(EstimateError::settings(
            "layerHeight",
            "is too small for the model height",
        ))
    }
}

/// Estimate with the default model.
pub fn estimate_print(
    mesh: &TriangleMesh,
    settings: &PrintSettings,
) -> Result<Option<PrintEstimate>> {
    Estimator::default().estimate(mesh, settings)
}
