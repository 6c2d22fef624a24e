#![warn(missing_docs)]

//! Print-time and material estimation for printcast.
//!
//! The estimator approximates every layer by the footprint of the model's
//! bounding box, so it needs only the mesh bounds and a [`PrintSettings`]
//! record. Physical constants live in an [`EstimatorModel`] that defaults to
//! PLA on a 1.75 mm filament printer.
//!
//! # Example
//!
//! ```ignore
//! use printcast_estimate::{estimate_print, PrintSettings};
//! use printcast_mesh::decode_stl;
//!
//! let mesh = decode_stl(&std::fs::read("part.stl")?)?;
//! if let Some(estimate) = estimate_print(&mesh, &PrintSettings::default())? {
//!     println!("Layers: {}", estimate.layers);
//!     println!("Print time: {:.0}s", estimate.total_time);
//! }
//! ```

pub mod error;
pub mod estimate;
pub mod model;
pub mod printer;
pub mod settings;

pub use error::{EstimateError, Result};
pub use estimate::{estimate_print, Estimator, PrintEstimate, TimeBreakdown};
pub use model::EstimatorModel;
pub use printer::PrinterProfile;
pub use settings::{PrintSettings, SpeedProfile, SpeedSet};
