//! Ingestion of a print job into a display-ready report.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use printcast_estimate::{Estimator, EstimatorModel, PrintEstimate, PrintSettings, PrinterProfile};
use printcast_gcode::{Analyzer, AnalyzerConfig, GcodeAnalysis, GcodeError};
use printcast_mesh::{
    decode_stl, decode_stl_cancellable, mesh_volume, mesh_weight, mm3_to_cm3, Aabb,
};
use printcast_units::{format_duration, MaterialUsage};
use serde::{Deserialize, Serialize};

use crate::kind::FileKind;
use crate::{Error, Result};

/// Everything an ingestion call needs besides the file itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestOptions {
    /// User print settings for mesh estimates.
    pub settings: PrintSettings,
    /// Constants of the mesh estimator.
    pub model: EstimatorModel,
    /// Constants of the G-code analyzer.
    pub analyzer: AnalyzerConfig,
    /// Printer to check the model's size against.
    pub printer: Option<PrinterProfile>,
}

/// Axis-aligned model bounds (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl From<Aabb> for Bounds {
    fn from(b: Aabb) -> Self {
        Self {
            min: [b.min.x, b.min.y, b.min.z],
            max: [b.max.x, b.max.y, b.max.z],
        }
    }
}

impl Bounds {
    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Report for a solid model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidReport {
    /// Triangle count.
    pub triangles: usize,
    /// Enclosed volume (cm³).
    pub volume: f64,
    /// Weight of the solid at full density (g).
    pub weight: f64,
    /// Model bounds; absent for an empty mesh.
    pub bounds: Option<Bounds>,
    /// Time and material estimate; absent for an empty mesh.
    pub estimate: Option<PrintEstimate>,
    /// Whether the model fits the selected printer.
    pub fits_printer: Option<bool>,
}

/// Result of ingesting one print job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Report {
    /// Estimated from a solid model.
    Solid(SolidReport),
    /// Replayed from a toolpath.
    Toolpath(GcodeAnalysis),
}

impl Report {
    /// Total print time (s), if known.
    pub fn total_time(&self) -> Option<f64> {
        match self {
            Self::Solid(s) => s.estimate.as_ref().map(|e| e.total_time),
            Self::Toolpath(a) => Some(a.total_time),
        }
    }

    /// Layer count, if known.
    pub fn layers(&self) -> Option<u32> {
        match self {
            Self::Solid(s) => s.estimate.as_ref().map(|e| e.layers),
            Self::Toolpath(a) => Some(a.layers),
        }
    }

    /// Filament consumption, if known.
    pub fn material_used(&self) -> Option<MaterialUsage> {
        match self {
            Self::Solid(s) => s.estimate.as_ref().map(|e| e.material_used),
            Self::Toolpath(a) => Some(a.material_used),
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let source = match self {
            Self::Solid(_) => "estimated",
            Self::Toolpath(_) => "from G-code",
        };
        match (self.total_time(), self.layers(), self.material_used()) {
            (Some(time), Some(layers), Some(m)) => format!(
                "{} ({source}), {layers} layers, {:.1}m filament ({:.1}g)",
                format_duration(time),
                m.length,
                m.weight
            ),
            _ => format!("no estimate ({source})"),
        }
    }
}

/// Ingest a print job held in memory.
pub fn ingest(kind: FileKind, bytes: &[u8], options: &IngestOptions) -> Result<Report> {
    run(kind, bytes, options, None)
}

/// Like [`ingest`], but gives up with [`Error::Cancelled`] once `cancel` is set.
pub fn ingest_cancellable(
    kind: FileKind,
    bytes: &[u8],
    options: &IngestOptions,
    cancel: &AtomicBool,
) -> Result<Report> {
    run(kind, bytes, options, Some(cancel))
}

fn run(
    kind: FileKind,
    bytes: &[u8],
    options: &IngestOptions,
    cancel: Option<&AtomicBool>,
) -> Result<Report> {
    debug!("ingesting {kind:?} job of {} bytes", bytes.len());
    let report = match kind {
        FileKind::Stl => Report::Solid(solid_report(bytes, options, cancel)?),
        FileKind::Gcode => {
            let analyzer = Analyzer::new(options.analyzer)?;
            let analysis = match cancel {
                Some(flag) => {
                    let text = std::str::from_utf8(bytes).map_err(GcodeError::Parse)?;
                    analyzer.analyze_cancellable(text, flag)?
                }
                None => analyzer.analyze_bytes(bytes)?,
            };
            Report::Toolpath(analysis)
        }
    };
    info!("{}", report.summary());
    Ok(report)
}

fn solid_report(
    bytes: &[u8],
    options: &IngestOptions,
    cancel: Option<&AtomicBool>,
) -> Result<SolidReport> {
    let estimator = Estimator::new(options.model)?;
    options.settings.validate()?;

    let mesh = match cancel {
        Some(flag) => decode_stl_cancellable(bytes, flag)?,
        None => decode_stl(bytes)?,
    };
    if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
        return Err(Error::Cancelled);
    }

    let volume_mm3 = mesh_volume(&mesh);
    let bounds = mesh.bounds();
    let estimate = estimator.estimate(&mesh, &options.settings)?;
    let fits_printer = match (&options.printer, &bounds) {
        (Some(printer), Some(b)) => Some(printer.fits(b)),
        _ => None,
    };

    Ok(SolidReport {
        triangles: mesh.num_triangles(),
        volume: mm3_to_cm3(volume_mm3),
        weight: mesh_weight(volume_mm3, &options.model.filament),
        bounds: bounds.map(Bounds::from),
        estimate,
        fits_printer,
    })
}
