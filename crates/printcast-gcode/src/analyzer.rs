//! Replay a toolpath to estimate print time and filament use.
//!
//! The analyzer is a fold of [`ToolpathState`] over the lines of the file.
//! Each motion command advances the cursor, accrues travel time at the
//! commanded feed rate and accrues forward extrusion. A slicer time
//! annotation replaces the accumulated time, so the last annotation in the
//! file wins over simulated motion before it.

use std::str::Lines;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};
use printcast_units::{Filament, MaterialUsage};
use serde::{Deserialize, Serialize};

use crate::command::{parse_line, ParsedLine};
use crate::error::{GcodeError, Result};

/// Lines processed between cancellation checks.
const CANCEL_POLL_INTERVAL: usize = 1 << 14;

/// Analyzer constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Filament used to convert extruded length into volume and weight.
    pub filament: Filament,
    /// Feed rate assumed until the file commands one (mm/min).
    pub default_feed_rate: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            filament: Filament::pla(),
            default_feed_rate: 1800.0,
        }
    }
}

impl AnalyzerConfig {
    /// Reject constants that would turn times or material into NaN or infinity.
    pub fn validate(&self) -> Result<()> {
        if !(self.default_feed_rate.is_finite() && self.default_feed_rate > 0.0) {
            return Err(GcodeError::InvalidConfig {
                field: "defaultFeedRate",
                reason: "must be a positive number",
            });
        }
        if let Some(field) = self.filament.invalid_field() {
            return Err(GcodeError::InvalidConfig {
                field,
                reason: "out of range",
            });
        }
        Ok(())
    }
}

/// Result of analyzing a G-code file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcodeAnalysis {
    /// Total print time (s).
    pub total_time: f64,
    /// Number of layer markers seen.
    pub layers: u32,
    /// Filament consumed by forward extrusion.
    pub material_used: MaterialUsage,
}

/// Machine state after some prefix of the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolpathState {
    /// Cursor X (mm).
    pub x: f64,
    /// Cursor Y (mm).
    pub y: f64,
    /// Cursor Z (mm).
    pub z: f64,
    /// Extruder position (mm of filament).
    pub e: f64,
    /// Commanded feed rate (mm/min).
    pub feed_rate: f64,
    /// Accumulated time (s).
    pub time: f64,
    /// Accumulated forward extrusion (mm of filament).
    pub extruded: f64,
    /// Layer markers seen.
    pub layers: u32,
}

impl ToolpathState {
    /// State at the start of a file: cursor at the origin.
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            e: 0.0,
            feed_rate: config.default_feed_rate,
            time: 0.0,
            extruded: 0.0,
            layers: 0,
        }
    }

    /// Advance the state by one parsed line.
    pub fn apply(mut self, line: &ParsedLine) -> Self {
        if line.layer_marker {
            self.layers += 1;
        }

        if let Some(motion) = line.motion {
            match motion.f {
                Some(f) if f > 0.0 => self.feed_rate = f,
                Some(f) => trace!("ignoring non-positive feed rate {f}"),
                None => {}
            }

            let x = motion.x.unwrap_or(self.x);
            let y = motion.y.unwrap_or(self.y);
            let z = motion.z.unwrap_or(self.z);
            let e = motion.e.unwrap_or(self.e);

            let distance = ((x - self.x).powi(2) + (y - self.y).powi(2) + (z - self.z).powi(2)).sqrt();
            self.time += distance / (self.feed_rate / 60.0);

            if e > self.e {
                self.extruded += e - self.e;
            }

            self.x = x;
            self.y = y;
            self.z = z;
            self.e = e;
        }

        if let Some(seconds) = line.time_annotation {
            self.time = seconds;
        }

        self
    }

    /// Summarize the state as an analysis result.
    pub fn finish(&self, filament: &Filament) -> GcodeAnalysis {
        GcodeAnalysis {
            total_time: self.time,
            layers: self.layers,
            material_used: filament.usage_from_length(self.extruded),
        }
    }
}

/// State after one line, as produced by [`Analyzer::replay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolpathSnapshot<'a> {
    /// 1-based line number.
    pub line_number: usize,
    /// The line as it appears in the file.
    pub line: &'a str,
    /// State after applying the line.
    pub state: ToolpathState,
}

/// Iterator over per-line snapshots of a toolpath.
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    lines: Lines<'a>,
    line_number: usize,
    state: ToolpathState,
}

impl<'a> Iterator for Replay<'a> {
    type Item = ToolpathSnapshot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;
        self.state = self.state.apply(&parse_line(line));
        Some(ToolpathSnapshot {
            line_number: self.line_number,
            line,
            state: self.state,
        })
    }
}

/// G-code analyzer with injected constants.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer, rejecting invalid constants.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Constants in use.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze G-code text. Never fails: unrecognized lines are ignored.
    pub fn analyze(&self, text: &str) -> GcodeAnalysis {
        let state = text
            .lines()
            .map(parse_line)
            .fold(ToolpathState::new(&self.config), |state, line| state.apply(&line));
        self.finish(&state)
    }

    /// Analyze raw file bytes, which must be UTF-8.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<GcodeAnalysis> {
        let text = std::str::from_utf8(bytes).map_err(GcodeError::Parse)?;
        Ok(self.analyze(text))
    }

    /// Like [`analyze`](Self::analyze), but gives up with
    /// [`GcodeError::Cancelled`] once `cancel` is set.
    pub fn analyze_cancellable(&self, text: &str, cancel: &AtomicBool) -> Result<GcodeAnalysis> {
        let mut state = ToolpathState::new(&self.config);
        for (i, line) in text.lines().enumerate() {
            if i % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                debug!("G-code analysis cancelled at line {}", i + 1);
                return Err(GcodeError::Cancelled);
            }
            state = state.apply(&parse_line(line));
        }
        Ok(self.finish(&state))
    }

    /// Per-line snapshots of the machine state, for debugging.
    pub fn replay<'a>(&self, text: &'a str) -> Replay<'a> {
        Replay {
            lines: text.lines(),
            line_number: 0,
            state: ToolpathState::new(&self.config),
        }
    }

    fn finish(&self, state: &ToolpathState) -> GcodeAnalysis {
        let analysis = state.finish(&self.config.filament);
        debug!(
            "analyzed G-code: {} layers, {:.0}s, {:.3}m filament",
            analysis.layers, analysis.total_time, analysis.material_used.length
        );
        analysis
    }
}

/// Analyze G-code text with the default constants.
pub fn analyze_gcode(text: &str) -> GcodeAnalysis {
    Analyzer::default().analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_move() {
        let a = analyze_gcode("G1 X10 F600");
        assert_relative_eq!(a.total_time, 1.0);
        assert_eq!(a.layers, 0);
        assert_eq!(a.material_used, MaterialUsage::default());
    }

    #[test]
    fn test_default_feed_rate() {
        // 30 mm at 1800 mm/min.
        assert_relative_eq!(analyze_gcode("G0 X30").total_time, 1.0);
    }

    #[test]
    fn test_feed_rate_is_retained() {
        let a = analyze_gcode("G1 X10 F600\nG1 X20\nG1 X20 Y30 F1800");
        assert_relative_eq!(a.total_time, 1.0 + 1.0 + 1.0);
    }

    #[test]
    fn test_non_positive_feed_rate_ignored() {
        let a = analyze_gcode("G1 X10 F600\nG1 X20 F0");
        assert_relative_eq!(a.total_time, 2.0);
    }

    #[test]
    fn test_three_dimensional_distance() {
        let a = analyze_gcode("G1 X3 Y4 F60\nG1 Z12");
        // 5 mm then 12 mm at 1 mm/s.
        assert_relative_eq!(a.total_time, 17.0);
    }

    #[test]
    fn test_print_time_overrides() {
        let a = analyze_gcode("G1 X100 F600\n;PRINT_TIME:3600");
        assert_eq!(a.total_time, 3600.0);
    }

    #[test]
    fn test_last_annotation_wins_then_motion_accrues() {
        let a = analyze_gcode(";TIME:50\nG1 X100 F600\n;TIME:100\nG1 X110");
        assert_relative_eq!(a.total_time, 101.0);
    }

    #[test]
    fn test_retraction_not_counted() {
        let a = analyze_gcode("G1 X1 E5\nG1 E3\nG1 X2 E4");
        assert_relative_eq!(a.material_used.length, 0.006);

        let retract_only = analyze_gcode("G1 X1 E5\nG1 E-10\nG1 E-20");
        assert_relative_eq!(retract_only.material_used.length, 0.005);
    }

    #[test]
    fn test_material_conversion() {
        let a = analyze_gcode("G1 X10 E1000");
        let f = Filament::pla();
        assert_relative_eq!(a.material_used.length, 1.0);
        assert_relative_eq!(a.material_used.volume, f.cross_section(), epsilon = 1e-12);
        assert_relative_eq!(
            a.material_used.weight,
            1000.0 * f.cross_section() * 0.00124,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_layer_count() {
        let a = analyze_gcode(";LAYER:0\nG1 X1\n;LAYER:1\n; layer_height: 0.2\n;LAYER_CHANGE");
        assert_eq!(a.layers, 3);
    }

    #[test]
    fn test_unparsable_field_keeps_previous_value() {
        let a = analyze_gcode("G1 X1.2.3 Y5 F600");
        assert_relative_eq!(a.total_time, 0.5);
    }

    #[test]
    fn test_crlf_and_case() {
        let a = analyze_gcode("g1 x10 f600\r\ng1 x20\r\n");
        assert_relative_eq!(a.total_time, 2.0);
    }

    #[test]
    fn test_empty_input() {
        let a = analyze_gcode("");
        assert_eq!(a.total_time, 0.0);
        assert_eq!(a.layers, 0);
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Analyzer::default()
            .analyze_bytes(&[b'G', b'1', 0xFF, 0xFE])
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to analyze G-code file");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bytes_match_text() {
        let text = "G1 X10 F600\n;LAYER:1\nG1 Y10 E2";
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.analyze_bytes(text.as_bytes()).unwrap(), analyzer.analyze(text));
    }

    #[test]
    fn test_cancellable() {
        let analyzer = Analyzer::default();
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            analyzer.analyze_cancellable("G1 X10", &cancel),
            Err(GcodeError::Cancelled)
        ));
        cancel.store(false, Ordering::Relaxed);
        assert_eq!(
            analyzer.analyze_cancellable("G1 X10 F600", &cancel).unwrap(),
            analyzer.analyze("G1 X10 F600")
        );
    }

    #[test]
    fn test_replay_matches_fold() {
        let text = ";LAYER:0\nG1 X10 F600 E1\nG1 Y10 E0.5\n;TIME:42";
        let analyzer = Analyzer::default();
        let snapshots: Vec<_> = analyzer.replay(text).collect();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[1].line_number, 2);
        assert_eq!(snapshots[1].line, "G1 X10 F600 E1");
        assert_relative_eq!(snapshots[1].state.x, 10.0);
        assert_relative_eq!(snapshots[2].state.e, 0.5);
        assert_relative_eq!(snapshots[2].state.extruded, 1.0);
        let last = snapshots[3].state.finish(&Filament::pla());
        assert_eq!(last, analyzer.analyze(text));
    }

    #[test]
    fn test_custom_config() {
        let analyzer = Analyzer::new(AnalyzerConfig {
            default_feed_rate: 600.0,
            ..Default::default()
        })
        .unwrap();
        assert_relative_eq!(analyzer.analyze("G1 X10").total_time, 1.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        for feed in [0.0, -600.0, f64::NAN, f64::INFINITY] {
            let err = Analyzer::new(AnalyzerConfig {
                default_feed_rate: feed,
                ..Default::default()
            })
            .unwrap_err();
            assert!(matches!(
                err,
                GcodeError::InvalidConfig {
                    field: "defaultFeedRate",
                    ..
                }
            ));
        }
        let thin = AnalyzerConfig {
            filament: Filament {
                diameter: 0.0,
                ..Filament::pla()
            },
            ..Default::default()
        };
        assert!(matches!(
            thin.validate(),
            Err(GcodeError::InvalidConfig {
                field: "filament diameter",
                ..
            })
        ));
        assert!(AnalyzerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(analyze_gcode("G1 X1 E1")).unwrap();
        assert!(json["totalTime"].is_number());
        assert!(json["materialUsed"]["weight"].is_number());
        assert!(json.get("breakdown").is_none());
    }
}
