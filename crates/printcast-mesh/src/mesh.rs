//! Triangle mesh storage and triangle iteration.
//!
//! A mesh is stored either *flat* (nine floats per triangle, vertices
//! repeated) or *indexed* (a shared vertex pool plus index triples). Every
//! consumer reads it through [`TriangleMesh::triangles`], which yields the
//! same [`Triangle`] sequence for both layouts.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

/// A vector in model space (mm).
pub type Vec3 = Vector3<f64>;

/// Triangle mesh as decoded from a model file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub(crate) vertices: Vec<f32>,
    /// Triangle corners as indices into `vertices`; `None` for the flat layout.
    pub(crate) indices: Option<Vec<u32>>,
    /// One face normal per triangle: `[nx0, ny0, nz0, ...]`. May be empty.
    pub(crate) normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flat mesh where every nine floats form one triangle.
    pub fn flat(vertices: Vec<f32>, normals: Vec<f32>) -> Result<Self> {
        if vertices.len() % 9 != 0 {
            return Err(MeshError::Invalid(format!(
                "flat vertex buffer length {} is not a multiple of 9",
                vertices.len()
            )));
        }
        let mesh = Self {
            vertices,
            indices: None,
            normals,
        };
        mesh.check_normals()?;
        Ok(mesh)
    }

    /// Build an indexed mesh from a vertex pool and index triples.
    pub fn indexed(vertices: Vec<f32>, indices: Vec<u32>, normals: Vec<f32>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(MeshError::Invalid(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::Invalid(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }
        let pool = vertices.len() / 3;
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= pool) {
            return Err(MeshError::Invalid(format!(
                "index {bad} out of range for {pool} vertices"
            )));
        }
        let mesh = Self {
            vertices,
            indices: Some(indices),
            normals,
        };
        mesh.check_normals()?;
        Ok(mesh)
    }

    fn check_normals(&self) -> Result<()> {
        if !self.normals.is_empty() && self.normals.len() != self.num_triangles() * 3 {
            return Err(MeshError::Invalid(format!(
                "{} normal floats for {} triangles",
                self.normals.len(),
                self.num_triangles()
            )));
        }
        Ok(())
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertices.len() / 9,
        }
    }

    /// Number of stored vertices (the pool size for indexed meshes).
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True if the mesh holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.num_triangles() == 0
    }

    /// True for the indexed layout.
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Raw position buffer.
    pub fn positions(&self) -> &[f32] {
        &self.vertices
    }

    /// Raw index buffer, if indexed.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Raw face normal buffer (three floats per triangle, possibly empty).
    pub fn face_normals(&self) -> &[f32] {
        &self.normals
    }

    /// Stored face normal of triangle `index`, exactly as decoded.
    pub fn face_normal(&self, index: usize) -> Option<Vec3> {
        let n = self.normals.get(index * 3..index * 3 + 3)?;
        Some(Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64))
    }

    /// Per-corner normal buffer for renderers: each face normal repeated
    /// for its three corners, in triangle order.
    pub fn vertex_normals(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.normals.len() * 3);
        for n in self.normals.chunks_exact(3) {
            for _ in 0..3 {
                out.extend_from_slice(n);
            }
        }
        out
    }

    fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(
            self.vertices[i * 3] as f64,
            self.vertices[i * 3 + 1] as f64,
            self.vertices[i * 3 + 2] as f64,
        )
    }

    fn corner(&self, triangle: usize, k: usize) -> usize {
        match &self.indices {
            Some(indices) => indices[triangle * 3 + k] as usize,
            None => triangle * 3 + k,
        }
    }

    /// Iterate over triangles regardless of storage layout.
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles {
            mesh: self,
            next: 0,
            end: self.num_triangles(),
        }
    }

    /// Axis-aligned bounds of all stored vertices, or `None` if there are none.
    pub fn bounds(&self) -> Option<Aabb> {
        if self.vertices.len() < 3 {
            return None;
        }
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in self.vertices.chunks_exact(3) {
            for axis in 0..3 {
                let c = v[axis] as f64;
                min[axis] = min[axis].min(c);
                max[axis] = max[axis].max(c);
            }
        }
        Some(Aabb {
            min: Point3::new(min[0], min[1], min[2]),
            max: Point3::new(max[0], max[1], max[2]),
        })
    }

    /// Convert to the indexed layout, merging bit-identical vertices.
    ///
    /// Already indexed meshes are returned unchanged.
    pub fn weld(&self) -> TriangleMesh {
        if self.is_indexed() {
            return self.clone();
        }
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(self.vertices.len() / 3);
        for v in self.vertices.chunks_exact(3) {
            let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
            let index = *lookup.entry(key).or_insert_with(|| {
                vertices.extend_from_slice(v);
                (vertices.len() / 3 - 1) as u32
            });
            indices.push(index);
        }
        TriangleMesh {
            vertices,
            indices: Some(indices),
            normals: self.normals.clone(),
        }
    }

    /// Copy of the mesh moved by `(dx, dy, dz)`.
    pub fn translated(&self, dx: f32, dy: f32, dz: f32) -> TriangleMesh {
        let mut out = self.clone();
        for v in out.vertices.chunks_exact_mut(3) {
            v[0] += dx;
            v[1] += dy;
            v[2] += dz;
        }
        out
    }
}

/// One triangle of a mesh, promoted to double precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: Vec3,
    /// Second corner.
    pub b: Vec3,
    /// Third corner.
    pub c: Vec3,
}

impl Triangle {
    /// Signed volume of the tetrahedron spanned by this triangle and the origin.
    pub fn signed_volume(&self) -> f64 {
        self.a.dot(&self.b.cross(&self.c)) / 6.0
    }
}

/// Iterator over the triangles of a [`TriangleMesh`].
#[derive(Debug, Clone)]
pub struct Triangles<'a> {
    mesh: &'a TriangleMesh,
    next: usize,
    end: usize,
}

impl Iterator for Triangles<'_> {
    type Item = Triangle;

    fn next(&mut self) -> Option<Triangle> {
        if self.next >= self.end {
            return None;
        }
        let t = self.next;
        self.next += 1;
        let m = self.mesh;
        Some(Triangle {
            a: m.vertex(m.corner(t, 0)),
            b: m.vertex(m.corner(t, 1)),
            c: m.vertex(m.corner(t, 2)),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Triangles<'_> {}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}
