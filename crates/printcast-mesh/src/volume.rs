//! Enclosed volume of a closed triangle mesh.
//!
//! Each triangle and the origin span a tetrahedron with signed volume
//! `a · (b × c) / 6`. Summed over a closed, consistently wound surface the
//! contributions outside the solid cancel, leaving the enclosed volume
//! wherever the origin lies.

use printcast_units::Filament;

use crate::mesh::{Triangle, TriangleMesh};

pub use printcast_units::mm3_to_cm3;

/// Sum of signed tetrahedron volumes (mm³). Positive for outward winding.
pub fn signed_volume<I>(triangles: I) -> f64
where
    I: IntoIterator<Item = Triangle>,
{
    triangles.into_iter().map(|t| t.signed_volume()).sum()
}

/// Enclosed volume of `mesh` in mm³, independent of winding direction.
///
/// A mesh without positions has volume 0.
pub fn mesh_volume(mesh: &TriangleMesh) -> f64 {
    if mesh.positions().is_empty() {
        return 0.0;
    }
    signed_volume(mesh.triangles()).abs()
}

/// Weight in grams of a solid of `volume_mm3` printed at full density.
pub fn mesh_weight(volume_mm3: f64, filament: &Filament) -> f64 {
    filament.weight_of(volume_mm3)
}
