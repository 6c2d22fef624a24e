//! End-to-end ingestion of STL and G-code jobs.

use std::sync::atomic::AtomicBool;

use approx::assert_relative_eq;
use printcast::{
    ingest, ingest_cancellable, CancellationToken, ErrorKind, EstimateJob, FileKind,
    IngestOptions, PrintSettings, PrinterProfile, Report,
};
use printcast_mesh::{cuboid, encode_stl};

fn cube_stl(edge: f32) -> Vec<u8> {
    encode_stl(&cuboid([0.0; 3], [edge; 3])).unwrap()
}

fn solid(report: Report) -> printcast::SolidReport {
    match report {
        Report::Solid(s) => s,
        other => panic!("expected solid report, got {other:?}"),
    }
}

#[test]
fn test_cube_report() {
    let report = ingest(FileKind::Stl, &cube_stl(10.0), &IngestOptions::default()).unwrap();
    assert_eq!(report.layers(), Some(50));

    let s = solid(report);
    assert_eq!(s.triangles, 12);
    assert_relative_eq!(s.volume, 1.0, epsilon = 1e-9);
    assert_relative_eq!(s.weight, 1.24, epsilon = 1e-9);
    assert_eq!(s.bounds.unwrap().size(), [10.0, 10.0, 10.0]);
    assert_eq!(s.fits_printer, None);

    let estimate = s.estimate.unwrap();
    assert_eq!(estimate.breakdown.total(), estimate.total_time);
}

#[test]
fn test_ingest_is_deterministic() {
    let bytes = cube_stl(37.0);
    let options = IngestOptions::default();
    let a = ingest(FileKind::Stl, &bytes, &options).unwrap();
    let b = ingest(FileKind::Stl, &bytes, &options).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_truncated_stl() {
    let mut bytes = cube_stl(10.0);
    bytes.truncate(bytes.len() - 10);
    let err = ingest(FileKind::Stl, &bytes, &IngestOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedFile);
    assert_eq!(err.to_string(), "failed to parse STL file");
}

#[test]
fn test_short_header_is_parse_error() {
    let err = ingest(FileKind::Stl, &[0u8; 40], &IngestOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn test_invalid_settings() {
    let options = IngestOptions {
        settings: PrintSettings {
            infill_density: 140.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let err = ingest(FileKind::Stl, &cube_stl(10.0), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSettings);
}

#[test]
fn test_empty_stl_has_no_estimate() {
    let mut bytes = vec![0u8; 84];
    bytes[..4].copy_from_slice(b"none");
    let report = ingest(FileKind::Stl, &bytes, &IngestOptions::default()).unwrap();
    assert_eq!(report.total_time(), None);
    assert_eq!(report.summary(), "no estimate (estimated)");
    let s = solid(report);
    assert_eq!(s.volume, 0.0);
    assert!(s.bounds.is_none());
}

#[test]
fn test_fits_printer() {
    let options = IngestOptions {
        printer: Some(PrinterProfile::bambu_a1()),
        ..Default::default()
    };
    let small = solid(ingest(FileKind::Stl, &cube_stl(100.0), &options).unwrap());
    let large = solid(ingest(FileKind::Stl, &cube_stl(300.0), &options).unwrap());
    assert_eq!(small.fits_printer, Some(true));
    assert_eq!(large.fits_printer, Some(false));
}

#[test]
fn test_gcode_job() {
    let gcode = b";LAYER:0\nG1 X10 Y0 E1 F600\n;LAYER:1\nG1 X10 Y10 E2\n";
    let report = ingest(FileKind::Gcode, gcode, &IngestOptions::default()).unwrap();
    assert_eq!(report.layers(), Some(2));
    assert_relative_eq!(report.total_time().unwrap(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(report.material_used().unwrap().length, 0.002, epsilon = 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "toolpath");
    assert_eq!(json["layers"], 2);
}

#[test]
fn test_zero_feed_rate_rejected() {
    let options: IngestOptions =
        serde_json::from_str(r#"{"analyzer": {"defaultFeedRate": 0}}"#).unwrap();
    let err = ingest(FileKind::Gcode, b"G1 X10\nG1 X10\n", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSettings);
    assert_eq!(
        err.to_string(),
        "invalid analyzer config: defaultFeedRate must be a positive number"
    );
}

#[test]
fn test_tiny_layer_height_rejected() {
    let options = IngestOptions {
        settings: PrintSettings {
            layer_height: 1e-9,
            ..Default::default()
        },
        ..Default::default()
    };
    let err = ingest(FileKind::Stl, &cube_stl(10.0), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSettings);
}

#[test]
fn test_gcode_not_utf8() {
    let err = ingest(FileKind::Gcode, &[0x47, 0x31, 0xff], &IngestOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn test_cancelled_before_start() {
    let cancel = AtomicBool::new(true);
    let options = IngestOptions::default();
    let stl = ingest_cancellable(FileKind::Stl, &cube_stl(10.0), &options, &cancel).unwrap_err();
    let gcode = ingest_cancellable(FileKind::Gcode, b"G1 X1\n", &options, &cancel).unwrap_err();
    assert_eq!(stl.kind(), ErrorKind::Cancelled);
    assert_eq!(gcode.kind(), ErrorKind::Cancelled);
}

#[test]
fn test_background_job() {
    let job = EstimateJob::spawn(FileKind::Stl, cube_stl(20.0), IngestOptions::default());
    let report = job.join().unwrap();
    assert_eq!(report.layers(), Some(100));
}

#[test]
fn test_background_job_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    let job = EstimateJob::spawn_with_token(
        FileKind::Stl,
        cube_stl(20.0),
        IngestOptions::default(),
        token.clone(),
    );
    assert!(job.token().is_cancelled());
    assert_eq!(job.join().unwrap_err().kind(), ErrorKind::Cancelled);
}
