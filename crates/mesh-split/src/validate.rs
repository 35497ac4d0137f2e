//! Input data validation.
//!
//! The splitter trusts its upstream decoder for well-formed geometry, but it
//! refuses to build parts from indices that point nowhere or from positions
//! that cannot be spatially hashed.

use tracing::{debug, warn};

use crate::Mesh;
use crate::error::{MeshError, MeshResult};

/// Summary of a successful data validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataValidation {
    /// Number of vertices checked.
    pub vertex_count: usize,
    /// Number of triangles checked.
    pub face_count: usize,
    /// Whether the normals buffer is present and parallel to the positions.
    pub normals_usable: bool,
    /// Whether a normals buffer was present but had the wrong length.
    pub normals_mismatched: bool,
}

/// Check that a mesh can be split without fabricating geometry.
///
/// Fails fast on the first non-finite coordinate or out-of-range index.
/// A normals buffer with the wrong length is not an error; it is reported
/// and later treated as absent.
///
/// # Example
///
/// ```
/// use mesh_split::{Mesh, MeshError, validate_mesh_data};
/// use nalgebra::Point3;
///
/// let mesh = Mesh::indexed(vec![Point3::origin(); 3], vec![[0, 1, 3]]);
/// let err = validate_mesh_data(&mesh).unwrap_err();
/// assert!(matches!(err, MeshError::InvalidVertexIndex { face_index: 0, vertex_index: 3, .. }));
/// ```
pub fn validate_mesh_data(mesh: &Mesh) -> MeshResult<DataValidation> {
    let vertex_count = mesh.vertex_count();

    for (vertex_idx, p) in mesh.positions.iter().enumerate() {
        for (coord_name, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::invalid_coordinate(vertex_idx, coord_name, value));
            }
        }
    }

    if let Some(indices) = &mesh.indices {
        for (face_idx, face) in indices.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(MeshError::invalid_vertex_index(face_idx, bad, vertex_count));
            }
        }
    }

    let normals_usable = mesh.usable_normals().is_some();
    let normals_mismatched = mesh.normals.is_some() && !normals_usable;
    if normals_mismatched {
        warn!(
            "Ignoring normals buffer: {} normals for {} vertices",
            mesh.normals.as_ref().map_or(0, Vec::len),
            vertex_count
        );
    }

    let result = DataValidation {
        vertex_count,
        face_count: mesh.face_count(),
        normals_usable,
        normals_mismatched,
    };
    debug!(?result, "Mesh data validated");
    Ok(result)
}
