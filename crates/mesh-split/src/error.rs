//! Error types for mesh splitting.
//!
//! Splitting never fails on a structurally valid mesh: oversized meshes,
//! under-welded meshes and exhausted retries all degrade to "one part".
//! The errors here cover input that is malformed (bad indices, NaN
//! coordinates, ragged flat buffers) and parameters that make no sense.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `SPLIT-XXXX`:
//! - `SPLIT-2xxx`: Input validation errors (topology, coordinates, buffers)
//! - `SPLIT-3xxx`: Parameter errors
//!
//! # Example
//!
//! ```
//! use mesh_split::{ErrorCode, MeshError};
//!
//! let err = MeshError::invalid_vertex_index(5, 100, 50);
//! assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
//! assert_eq!(err.code().as_str(), "SPLIT-2001");
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// SPLIT-2001: Triangle references a vertex that does not exist
    InvalidVertexIndex = 2001,
    /// SPLIT-2002: Vertex has a NaN or infinite coordinate
    InvalidCoordinate = 2002,
    /// SPLIT-2003: Flat buffer length is not a multiple of three
    MalformedBuffer = 2003,
    /// SPLIT-3001: Split parameters are out of range
    InvalidParams = 3001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `SPLIT-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidVertexIndex => "SPLIT-2001",
            ErrorCode::InvalidCoordinate => "SPLIT-2002",
            ErrorCode::MalformedBuffer => "SPLIT-2003",
            ErrorCode::InvalidParams => "SPLIT-3001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while splitting a mesh.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Invalid vertex index in the index buffer.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(mesh_split::validation::vertex_index),
        help("The decoder produced an index buffer that does not match its vertex buffer.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(mesh_split::validation::coordinate),
        help("Vertex welding cannot hash non-finite positions. Check the source file.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// A flat attribute buffer does not hold whole triplets.
    #[error("malformed {buffer} buffer: length {len} is not a multiple of 3")]
    #[diagnostic(
        code(mesh_split::validation::buffer),
        help("Positions and normals are xyz triplets; indices come in triangles.")
    )]
    MalformedBuffer { buffer: &'static str, len: usize },

    /// Split parameters are out of range.
    #[error("invalid split parameters: {details}")]
    #[diagnostic(code(mesh_split::params::invalid))]
    InvalidParams { details: String },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::MalformedBuffer { .. } => ErrorCode::MalformedBuffer,
            MeshError::InvalidParams { .. } => ErrorCode::InvalidParams,
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        MeshError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        MeshError::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create a MalformedBuffer error.
    pub fn malformed_buffer(buffer: &'static str, len: usize) -> Self {
        MeshError::MalformedBuffer { buffer, len }
    }

    /// Create an InvalidParams error.
    pub fn invalid_params(details: impl Into<String>) -> Self {
        MeshError::InvalidParams {
            details: details.into(),
        }
    }
}
