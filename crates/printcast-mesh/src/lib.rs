#![warn(missing_docs)]

//! Triangle meshes for printcast: binary STL decoding and volume integration.
//!
//! # Example
//!
//! ```ignore
//! use printcast_mesh::{decode_stl, mesh_volume, mm3_to_cm3};
//!
//! let bytes = std::fs::read("part.stl")?;
//! let mesh = decode_stl(&bytes)?;
//! println!("Volume: {:.2} cm³", mm3_to_cm3(mesh_volume(&mesh)));
//! ```

pub mod error;
pub mod mesh;
pub mod primitives;
pub mod stl;
pub mod volume;

pub use error::{MeshError, Result, StlErrorKind};
pub use mesh::{Aabb, Triangle, TriangleMesh, Triangles, Vec3};
pub use primitives::{cuboid, cuboid_flat};
pub use stl::{decode_stl, decode_stl_cancellable, encode_stl, triangle_count};
pub use volume::{mesh_volume, mesh_weight, mm3_to_cm3, signed_volume};
