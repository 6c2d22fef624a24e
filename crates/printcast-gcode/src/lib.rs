#![warn(missing_docs)]

//! G-code analysis for printcast.
//!
//! This crate replays a pre-sliced toolpath to recover print time, layer
//! count and filament use without any model geometry. Motion commands are
//! simulated at their commanded feed rate; slicer annotations such as
//! `;TIME:` override the simulated time when present.
//!
//! # Example
//!
//! ```ignore
//! use printcast_gcode::analyze_gcode;
//!
//! let gcode = std::fs::read_to_string("part.gcode")?;
//! let analysis = analyze_gcode(&gcode);
//! println!("Layers: {}", analysis.layers);
//! println!("Print time: {:.0}s", analysis.total_time);
//! ```

pub mod analyzer;
pub mod command;
pub mod error;

pub use analyzer::{
    analyze_gcode, Analyzer, AnalyzerConfig, GcodeAnalysis, Replay, ToolpathSnapshot,
    ToolpathState,
};
pub use command::{parse_line, Motion, ParsedLine};
pub use error::{GcodeError, Result};
