//! Binary STL decoding and encoding.
//!
//! Layout: an 80-byte header (ignored), a little-endian `u32` triangle
//! count, then one 50-byte record per triangle: the face normal
//! (3 × `f32`), three vertices (3 × 3 × `f32`) and a 2-byte attribute
//! field (ignored). All floats are little-endian IEEE-754.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};

use crate::error::{MeshError, Result, StlErrorKind};
use crate::mesh::TriangleMesh;

/// Length of the ignored header.
pub const HEADER_LEN: usize = 80;

/// Length of one triangle record.
pub const RECORD_LEN: usize = 50;

/// Records decoded between cancellation checks.
const CANCEL_POLL_INTERVAL: usize = 1 << 14;

/// Sequential little-endian reader over a byte buffer.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.offset.checked_add(N)?;
        let bytes: [u8; N] = self.data.get(self.offset..end)?.try_into().ok()?;
        self.offset = end;
        Some(bytes)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    fn f32(&mut self) -> Option<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    fn vec3(&mut self, out: &mut Vec<f32>) -> Option<()> {
        for _ in 0..3 {
            out.push(self.f32()?);
        }
        Some(())
    }

    fn skip(&mut self, n: usize) -> Option<()> {
        let end = self.offset.checked_add(n)?;
        if end > self.data.len() {
            return None;
        }
        self.offset = end;
        Some(())
    }
}

/// Decode a binary STL buffer into a flat [`TriangleMesh`].
///
/// The declared triangle count is checked against the buffer length before
/// any record is read; bytes after the last declared record are ignored.
pub fn decode_stl(data: &[u8]) -> Result<TriangleMesh> {
    decode(data, None)
}

/// Like [`decode_stl`], but gives up with [`MeshError::Cancelled`] once
/// `cancel` is set.
pub fn decode_stl_cancellable(data: &[u8], cancel: &AtomicBool) -> Result<TriangleMesh> {
    decode(data, Some(cancel))
}

/// Validate the header and return the declared triangle count.
pub fn triangle_count(data: &[u8]) -> Result<u32> {
    let declared = Reader::new(data, HEADER_LEN)
        .u32()
        .ok_or(MeshError::Parse(StlErrorKind::HeaderTooShort { len: data.len() }))?;

    let expected = (declared as usize)
        .checked_mul(RECORD_LEN)
        .and_then(|n| n.checked_add(HEADER_LEN + 4))
        .ok_or(MeshError::Parse(StlErrorKind::CountOverflow { declared }))?;
    if expected > data.len() {
        return Err(MeshError::Parse(StlErrorKind::Truncated {
            declared,
            expected,
            actual: data.len(),
        }));
    }
    Ok(declared)
}

fn decode(data: &[u8], cancel: Option<&AtomicBool>) -> Result<TriangleMesh> {
    let count = triangle_count(data)? as usize;
    debug!("decoding binary STL: {count} triangles, {} bytes", data.len());

    let truncated = || {
        MeshError::Parse(StlErrorKind::Truncated {
            declared: count as u32,
            expected: HEADER_LEN + 4 + count * RECORD_LEN,
            actual: data.len(),
        })
    };

    let mut reader = Reader::new(data, HEADER_LEN + 4);
    let mut vertices = Vec::with_capacity(count * 9);
    let mut normals = Vec::with_capacity(count * 3);

    for i in 0..count {
        if i % CANCEL_POLL_INTERVAL == 0 && cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            debug!("STL decoding cancelled after {i} triangles");
            return Err(MeshError::Cancelled);
        }
        reader.vec3(&mut normals).ok_or_else(truncated)?;
        for _ in 0..3 {
            reader.vec3(&mut vertices).ok_or_else(truncated)?;
        }
        reader.skip(2).ok_or_else(truncated)?;
    }
    trace!("STL decoder stopped at offset {}", reader.offset);

    TriangleMesh::flat(vertices, normals)
}

/// Encode a mesh as binary STL.
///
/// Stored face normals are written as-is; meshes without normals get
/// normals computed from the winding. Fails for meshes with more triangles
/// than the format's 32-bit count can hold.
pub fn encode_stl(mesh: &TriangleMesh) -> Result<Vec<u8>> {
    let count = count_field(mesh.num_triangles())?;
    let mut data = Vec::with_capacity(HEADER_LEN + 4 + mesh.num_triangles() * RECORD_LEN);

    let mut header = [b' '; HEADER_LEN];
    let tag = b"printcast binary STL";
    header[..tag.len()].copy_from_slice(tag);
    data.extend_from_slice(&header);
    data.extend_from_slice(&count.to_le_bytes());

    for (i, tri) in mesh.triangles().enumerate() {
        let normal = mesh.face_normal(i).unwrap_or_else(|| {
            let n = (tri.b - tri.a).cross(&(tri.c - tri.a));
            let len = n.norm();
            if len > 1e-12 {
                n / len
            } else {
                n
            }
        });
        for v in [normal, tri.a, tri.b, tri.c] {
            data.extend_from_slice(&(v.x as f32).to_le_bytes());
            data.extend_from_slice(&(v.y as f32).to_le_bytes());
            data.extend_from_slice(&(v.z as f32).to_le_bytes());
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(data)
}

fn count_field(triangles: usize) -> Result<u32> {
    u32::try_from(triangles).map_err(|_| {
        MeshError::Invalid(format!(
            "{triangles} triangles exceed the binary STL limit of {}",
            u32::MAX
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cuboid;

    fn header_with_count(count: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&count.to_le_bytes());
        data
    }

    fn push_f32s(data: &mut Vec<u8>, values: &[f32]) {
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }

    #[test]
    fn test_zero_triangles() {
        let mesh = decode_stl(&header_with_count(0)).unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.positions().is_empty());
    }

    #[test]
    fn test_single_record() {
        let mut data = header_with_count(1);
        // Normal deliberately not unit length: stored as read.
        push_f32s(&mut data, &[0.0, 0.0, 2.0]);
        push_f32s(&mut data, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        data.extend_from_slice(&[0xAB, 0xCD]);

        let mesh = decode_stl(&data).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.face_normals(), &[0.0, 0.0, 2.0]);
        assert_eq!(
            mesh.positions(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut data = header_with_count(0);
        data.extend_from_slice(b"garbage");
        assert!(decode_stl(&data).unwrap().is_empty());
    }

    #[test]
    fn test_header_too_short() {
        let err = decode_stl(&[0u8; 83]).unwrap_err();
        assert_eq!(err.to_string(), "failed to parse STL file");
        assert_eq!(
            err.stl_kind(),
            Some(&StlErrorKind::HeaderTooShort { len: 83 })
        );
        assert!(!err.is_truncated());
    }

    #[test]
    fn test_truncated_file() {
        let mut data = header_with_count(2);
        data.extend_from_slice(&[0u8; RECORD_LEN + 10]);
        let err = decode_stl(&data).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(
            err.stl_kind(),
            Some(&StlErrorKind::Truncated {
                declared: 2,
                expected: 184,
                actual: 144,
            })
        );
    }

    #[test]
    fn test_huge_count_is_truncated_not_panic() {
        let err = decode_stl(&header_with_count(u32::MAX)).unwrap_err();
        assert!(err.stl_kind().is_some());
    }

    #[test]
    fn test_encode_decode_cube() {
        let cube = cuboid([0.0; 3], [10.0; 3]);
        let bytes = encode_stl(&cube).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 4 + 12 * RECORD_LEN);

        let decoded = decode_stl(&bytes).unwrap();
        assert_eq!(decoded.num_triangles(), 12);
        assert_eq!(decoded.face_normals(), cube.face_normals());
        let a: Vec<_> = cube.triangles().collect();
        let b: Vec<_> = decoded.triangles().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled() {
        let bytes = encode_stl(&cuboid([0.0; 3], [1.0; 3])).unwrap();
        let cancel = AtomicBool::new(true);
        let err = decode_stl_cancellable(&bytes, &cancel).unwrap_err();
        assert!(matches!(err, MeshError::Cancelled));

        cancel.store(false, Ordering::Relaxed);
        assert_eq!(decode_stl_cancellable(&bytes, &cancel).unwrap().num_triangles(), 12);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_count_beyond_u32_rejected() {
        assert_eq!(count_field(u32::MAX as usize).unwrap(), u32::MAX);
        let err = count_field(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, MeshError::Invalid(_)));
        assert!(err.to_string().contains("4294967296 triangles"));
    }
}
