//! Error types for mesh decoding and construction.

use thiserror::Error;

/// Structural reason an STL buffer was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StlErrorKind {
    /// Buffer cannot hold the 80-byte header and the triangle count.
    #[error("header too short: {len} bytes")]
    HeaderTooShort {
        /// Actual buffer length.
        len: usize,
    },

    /// Declared triangle count needs more bytes than the buffer holds.
    #[error("truncated file: {declared} triangles need {expected} bytes, found {actual}")]
    Truncated {
        /// Triangle count from the header.
        declared: u32,
        /// Bytes required by the declared count.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// Declared triangle count overflows the addressable size.
    #[error("triangle count {declared} overflows the address space")]
    CountOverflow {
        /// Triangle count from the header.
        declared: u32,
    },
}

/// Errors that can occur while decoding or building a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// STL decoding failed. The cause is available via [`MeshError::stl_kind`].
    #[error("failed to parse STL file")]
    Parse(#[source] StlErrorKind),

    /// Buffers violate the mesh layout invariants.
    #[error("invalid mesh: {0}")]
    Invalid(String),

    /// Decoding was cancelled by the caller.
    #[error("mesh decoding cancelled")]
    Cancelled,
}

impl MeshError {
    /// Typed cause of an STL parse failure.
    pub fn stl_kind(&self) -> Option<&StlErrorKind> {
        match self {
            Self::Parse(kind) => Some(kind),
            _ => None,
        }
    }

    /// True when the declared triangle count exceeded the buffer.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Parse(StlErrorKind::Truncated { .. }))
    }
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
