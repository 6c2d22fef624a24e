#![warn(missing_docs)]

//! printcast: print-time, layer and filament estimates for 3D print jobs.
//!
//! A job is either a binary STL solid, estimated with a bounding-box time
//! model, or a pre-sliced G-code toolpath, replayed move by move. Both yield
//! a [`Report`] with the same time/layers/material view.
//!
//! # Example
//!
//! ```rust,no_run
//! use printcast::{ingest, FileKind, IngestOptions};
//!
//! let path = "bracket.stl";
//! let kind = FileKind::from_path(path).expect("unsupported file");
//! let bytes = std::fs::read(path).unwrap();
//! let report = ingest(kind, &bytes, &IngestOptions::default()).unwrap();
//! println!("{}", report.summary());
//! ```

use thiserror::Error;

pub mod job;
pub mod kind;
pub mod report;

pub use job::{CancellationToken, EstimateJob};
pub use kind::FileKind;
pub use report::{ingest, ingest_cancellable, Bounds, IngestOptions, Report, SolidReport};

pub use printcast_estimate::{
    estimate_print, EstimateError, Estimator, EstimatorModel, PrintEstimate, PrintSettings,
    PrinterProfile, SpeedProfile, TimeBreakdown,
};
pub use printcast_gcode::{analyze_gcode, Analyzer, AnalyzerConfig, GcodeAnalysis, GcodeError};
pub use printcast_mesh::{decode_stl, mesh_volume, MeshError, StlErrorKind, TriangleMesh};
pub use printcast_units::{format_duration, Filament, MaterialUsage};

/// Errors returned by the ingestion pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Mesh decoding failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// G-code analysis failed.
    #[error(transparent)]
    Gcode(#[from] GcodeError),
    /// Settings or model constants were rejected.
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    /// The job was cancelled.
    #[error("estimation cancelled")]
    Cancelled,
    /// The background worker panicked.
    #[error("estimation worker panicked")]
    WorkerPanicked,
}

/// Coarse failure category, for presenting errors to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input could not be decoded.
    Parse,
    /// Declared STL triangle count exceeds the file.
    TruncatedFile,
    /// Settings out of their domain.
    InvalidSettings,
    /// Cancelled by the caller.
    Cancelled,
    /// Failure inside printcast itself.
    Internal,
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Mesh(e) if e.is_truncated() => ErrorKind::TruncatedFile,
            Self::Mesh(MeshError::Cancelled) | Self::Gcode(GcodeError::Cancelled) => {
                ErrorKind::Cancelled
            }
            Self::Mesh(_) | Self::Gcode(GcodeError::Parse(_)) => ErrorKind::Parse,
            Self::Estimate(_) | Self::Gcode(GcodeError::InvalidConfig { .. }) => {
                ErrorKind::InvalidSettings
            }
            Self::Cancelled => ErrorKind::Cancelled,
            Self::WorkerPanicked => ErrorKind::Internal,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
