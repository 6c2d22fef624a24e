//! WASM bindings for printcast.

use printcast::{
    analyze_gcode, ingest, FileKind, IngestOptions, PrintSettings, PrinterProfile, Report,
    SpeedProfile,
};
use printcast_mesh::{decode_stl, mesh_volume, mm3_to_cm3};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Decoded STL ready for a vertex-buffer viewer.
#[wasm_bindgen]
pub struct WasmMesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    triangle_count: usize,
    volume: f64,
}

#[wasm_bindgen]
impl WasmMesh {
    /// Flat xyz positions, three vertices per triangle.
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.positions.as_slice())
    }

    /// Per-vertex normals matching `positions`.
    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.normals.as_slice())
    }

    /// Number of triangles.
    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Enclosed volume (cm³).
    #[wasm_bindgen(getter)]
    pub fn volume(&self) -> f64 {
        self.volume
    }
}

fn mesh_buffers(bytes: &[u8]) -> Result<WasmMesh, String> {
    let mesh = decode_stl(bytes).map_err(|e| error_chain(&e))?;
    Ok(WasmMesh {
        positions: mesh.positions().to_vec(),
        normals: mesh.vertex_normals(),
        triangle_count: mesh.num_triangles(),
        volume: mm3_to_cm3(mesh_volume(&mesh)),
    })
}

fn solid_report(bytes: &[u8], settings_json: &str) -> Result<Report, String> {
    let settings = if settings_json.trim().is_empty() {
        PrintSettings::default()
    } else {
        serde_json::from_str(settings_json).map_err(|e| e.to_string())?
    };
    let options = IngestOptions {
        settings,
        ..Default::default()
    };
    ingest(FileKind::Stl, bytes, &options).map_err(|e| error_chain(&e))
}

/// Format an error with its sources, e.g. "failed to parse STL file: ...".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Decode a binary STL for display.
#[wasm_bindgen(js_name = decodeStl)]
pub fn decode_stl_js(bytes: &[u8]) -> Result<WasmMesh, JsError> {
    mesh_buffers(bytes).map_err(|e| JsError::new(&e))
}

/// Estimate an STL with JSON print settings (empty string for defaults).
#[wasm_bindgen(js_name = estimateStl)]
pub fn estimate_stl(bytes: &[u8], settings_json: &str) -> Result<JsValue, JsError> {
    let report = solid_report(bytes, settings_json).map_err(|e| JsError::new(&e))?;
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsError::new(&e.to_string()))
}

/// Analyze G-code text.
#[wasm_bindgen(js_name = analyzeGcode)]
pub fn analyze_gcode_js(text: &str) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&analyze_gcode(text)).map_err(|e| JsError::new(&e.to_string()))
}

/// Get available printer profiles.
#[wasm_bindgen(js_name = getPrinterProfiles)]
pub fn get_printer_profiles() -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&profile_infos()).map_err(|e| JsError::new(&e.to_string()))
}

/// Get the speed presets.
#[wasm_bindgen(js_name = getSpeedProfiles)]
pub fn get_speed_profiles() -> Result<JsValue, JsError> {
    let presets: Vec<SpeedProfileInfo> = SpeedProfile::ALL
        .into_iter()
        .map(|p| {
            let s = p.speeds();
            SpeedProfileInfo {
                id: p.name(),
                outer_wall_speed: s.outer,
                print_speed: s.inner,
                infill_speed: s.infill,
                travel_speed: s.travel,
            }
        })
        .collect();
    serde_wasm_bindgen::to_value(&presets).map_err(|e| JsError::new(&e.to_string()))
}

fn profile_infos() -> Vec<ProfileInfo> {
    PrinterProfile::all_profiles()
        .into_iter()
        .map(|p| ProfileInfo {
            id: p.id(),
            name: p.name,
            bed_x: p.bed_x,
            bed_y: p.bed_y,
            bed_z: p.bed_z,
            nozzle_diameter: p.nozzle_diameter,
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileInfo {
    id: String,
    name: String,
    bed_x: f64,
    bed_y: f64,
    bed_z: f64,
    nozzle_diameter: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeedProfileInfo {
    id: &'static str,
    outer_wall_speed: f64,
    print_speed: f64,
    infill_speed: f64,
    travel_speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use printcast_mesh::{cuboid, encode_stl};

    #[test]
    fn test_mesh_buffers() {
        let mesh = mesh_buffers(&encode_stl(&cuboid([0.0; 3], [10.0; 3])).unwrap()).unwrap();
        assert_eq!(mesh.triangle_count, 12);
        assert_eq!(mesh.positions.len(), 12 * 9);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!((mesh.volume - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_message() {
        let mut bytes = encode_stl(&cuboid([0.0; 3], [10.0; 3])).unwrap();
        bytes.truncate(100);
        let err = mesh_buffers(&bytes).err().unwrap();
        assert!(err.starts_with("failed to parse STL file: "));
    }

    #[test]
    fn test_settings_json() {
        let bytes = encode_stl(&cuboid([0.0; 3], [10.0; 3])).unwrap();
        let report = solid_report(&bytes, r#"{"layerHeight": 0.1}"#).unwrap();
        assert_eq!(report.layers(), Some(100));
        assert_eq!(solid_report(&bytes, "").unwrap().layers(), Some(50));
        assert!(solid_report(&bytes, r#"{"layerHeight": -1}"#).is_err());
        assert!(solid_report(&bytes, "{").is_err());
    }

    #[test]
    fn test_profile_ids() {
        let ids: Vec<_> = profile_infos().into_iter().map(|p| p.id).collect();
        assert!(ids.contains(&"bambu_lab_a1".to_string()));
    }
}
