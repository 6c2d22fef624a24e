//! Line classification for the subset of G-code the analyzer reads.
//!
//! Only three things are recognized: `G0`/`G1` motion commands, layer
//! markers embedded in slicer comments, and slicer time annotations.
//! Matching is done on the trimmed, uppercased line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref X_FIELD: Regex = Regex::new(r"X([-\d.]+)").expect("bad regex");
    static ref Y_FIELD: Regex = Regex::new(r"Y([-\d.]+)").expect("bad regex");
    static ref Z_FIELD: Regex = Regex::new(r"Z([-\d.]+)").expect("bad regex");
    static ref E_FIELD: Regex = Regex::new(r"E([-\d.]+)").expect("bad regex");
    static ref F_FIELD: Regex = Regex::new(r"F([-\d.]+)").expect("bad regex");
    static ref FIRST_INTEGER: Regex = Regex::new(r"\d+").expect("bad regex");
}

const LAYER_MARKERS: [&str; 2] = ["LAYER:", "LAYER_HEIGHT"];
const TIME_MARKERS: [&str; 2] = ["TIME:", "PRINT_TIME:"];

/// Fields of a `G0`/`G1` command. Absent or unparsable fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Target X (mm).
    pub x: Option<f64>,
    /// Target Y (mm).
    pub y: Option<f64>,
    /// Target Z (mm).
    pub z: Option<f64>,
    /// Target extruder position (mm of filament).
    pub e: Option<f64>,
    /// Feed rate (mm/min).
    pub f: Option<f64>,
}

/// What a single line contributes to the analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedLine {
    /// Line marks a layer boundary.
    pub layer_marker: bool,
    /// Motion command, if the line starts with `G0` or `G1`.
    pub motion: Option<Motion>,
    /// Authoritative total time in seconds from a slicer annotation.
    pub time_annotation: Option<f64>,
}

fn field(re: &Regex, line: &str) -> Option<f64> {
    let value: f64 = re.captures(line)?.get(1)?.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Classify one line of G-code.
pub fn parse_line(raw: &str) -> ParsedLine {
    let line = raw.trim().to_uppercase();

    let layer_marker = LAYER_MARKERS.iter().any(|m| line.contains(m));

    let motion = (line.starts_with("G1") || line.starts_with("G0")).then(|| Motion {
        x: field(&X_FIELD, &line),
        y: field(&Y_FIELD, &line),
        z: field(&Z_FIELD, &line),
        e: field(&E_FIELD, &line),
        f: field(&F_FIELD, &line),
    });

    let time_annotation = if TIME_MARKERS.iter().any(|m| line.contains(m)) {
        FIRST_INTEGER
            .find(&line)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|secs| secs as f64)
    } else {
        None
    };

    ParsedLine {
        layer_marker,
        motion,
        time_annotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_fields() {
        let parsed = parse_line("  g1 x10.5 y-2 e0.25 f1200 ");
        assert_eq!(
            parsed.motion,
            Some(Motion {
                x: Some(10.5),
                y: Some(-2.0),
                z: None,
                e: Some(0.25),
                f: Some(1200.0),
            })
        );
        assert!(!parsed.layer_marker);
        assert_eq!(parsed.time_annotation, None);
    }

    #[test]
    fn test_unparsable_field_is_absent() {
        let motion = parse_line("G1 X1.2.3 Y- Z.5").motion.unwrap();
        assert_eq!(motion.x, None);
        assert_eq!(motion.y, None);
        assert_eq!(motion.z, Some(0.5));
    }

    #[test]
    fn test_non_motion_lines() {
        assert_eq!(parse_line("M104 S200").motion, None);
        assert_eq!(parse_line("; G1 X10").motion, None);
        assert!(parse_line("G0 X1").motion.is_some());
    }

    #[test]
    fn test_layer_markers() {
        assert!(parse_line(";LAYER:3").layer_marker);
        assert!(parse_line("; layer_height = 0.2").layer_marker);
        assert!(!parse_line(";LAYER_CHANGE").layer_marker);
    }

    #[test]
    fn test_time_annotation() {
        assert_eq!(parse_line(";TIME:6120").time_annotation, Some(6120.0));
        assert_eq!(parse_line("; print_time: 3600").time_annotation, Some(3600.0));
        assert_eq!(parse_line(";TIME_ELAPSED:12.5").time_annotation, None);
        assert_eq!(parse_line(";TIME:").time_annotation, None);
    }
}
