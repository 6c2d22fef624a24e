//! Simple closed solids, used for fixtures and calibration prints.

use crate::mesh::TriangleMesh;

/// Axis-aligned box with one corner at `origin`, wound outward, indexed.
pub fn cuboid(origin: [f32; 3], size: [f32; 3]) -> TriangleMesh {
    let [x0, y0, z0] = origin;
    let [x1, y1, z1] = [x0 + size[0], y0 + size[1], z0 + size[2]];
    let vertices = vec![
        x0, y0, z0, x1, y0, z0, x1, y1, z0, x0, y1, z0, //
        x0, y0, z1, x1, y0, z1, x1, y1, z1, x0, y1, z1,
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, // bottom
        4, 5, 6, 4, 6, 7, // top
        0, 1, 5, 0, 5, 4, // front
        2, 3, 7, 2, 7, 6, // back
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
    ];
    let face = |n: [f32; 3]| [n, n].concat();
    let normals = [
        face([0.0, 0.0, -1.0]),
        face([0.0, 0.0, 1.0]),
        face([0.0, -1.0, 0.0]),
        face([0.0, 1.0, 0.0]),
        face([-1.0, 0.0, 0.0]),
        face([1.0, 0.0, 0.0]),
    ]
    .concat();

    TriangleMesh {
        vertices,
        indices: Some(indices),
        normals,
    }
}

/// The same box as [`cuboid`], expanded to the flat layout.
pub fn cuboid_flat(origin: [f32; 3], size: [f32; 3]) -> TriangleMesh {
    let indexed = cuboid(origin, size);
    let mut vertices = Vec::with_capacity(indexed.num_triangles() * 9);
    for tri in indexed.triangles() {
        for v in [tri.a, tri.b, tri.c] {
            vertices.extend_from_slice(&[v.x as f32, v.y as f32, v.z as f32]);
        }
    }
    TriangleMesh {
        vertices,
        indices: None,
        normals: indexed.normals,
    }
}
