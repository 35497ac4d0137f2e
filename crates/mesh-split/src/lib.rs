//! Split part-less triangle meshes into their connected components.
//!
//! Formats like STL store a bag of triangles with no notion of separate
//! parts. This crate recovers the parts by welding near-coincident vertices
//! and cutting the mesh along connectivity, producing one standalone indexed
//! mesh (with normals and bounds) per component. Welding only decides which
//! triangles belong together: every part keeps the source positions, so the
//! parts add up to exactly the input geometry.
//!
//! # Features
//!
//! - **Welding**: Spatial-hash vertex welding with a tolerance relative to the model size
//! - **Labeling**: Iterative flood fill, safe on meshes with hundreds of thousands of faces
//! - **Adaptive retry**: Tolerance grows when export noise shatters the mesh into fragments
//! - **Extraction**: Compact per-part meshes, normals carried over or recomputed
//! - **Guards**: Oversized meshes and implausible splits fall back to a single part
//!
//! # Quick Start
//!
//! ```
//! use mesh_split::{Mesh, SplitParams, split_by_connectivity};
//! use nalgebra::Point3;
//!
//! // Decoded STL: three vertices per triangle, nothing shared.
//! let mesh = Mesh::from_triangle_soup(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(5.0, 0.0, 0.0),
//!     Point3::new(6.0, 0.0, 0.0),
//!     Point3::new(5.0, 1.0, 0.0),
//! ]);
//!
//! let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
//! println!("{} parts after {} attempt(s)", result.part_count(), result.attempts);
//!
//! for part in &result.parts {
//!     println!(
//!         "{} faces, diagonal {:.2}",
//!         part.face_count(),
//!         part.bounding_diagonal()
//!     );
//! }
//! ```
//!
//! # Choosing a Tolerance
//!
//! By default the first weld uses 1% of the model's bounding diagonal. Parts
//! closer than that are merged, so for CAD assemblies with tightly packed
//! parts use [`SplitParams::for_cad`]. For noisy scans use
//! [`SplitParams::for_scans`].
//!
//! ```
//! use mesh_split::SplitParams;
//!
//! let params = SplitParams::for_cad()
//!     .with_max_parts(500)
//!     .with_recomputed_normals();
//! assert!(params.validate().is_ok());
//! ```
//!
//! # Fallback Behavior
//!
//! Splitting never fails on well-formed input. Whenever no sensible split
//! exists the whole input comes back as the only part, indexed and with
//! normals but with its positions untouched, and [`SplitResult::outcome`]
//! says why. Over the capacity guard no work is done at all and the part is
//! the input exactly as given.
//!
//! - [`SplitOutcome::Connected`]: the mesh is one piece
//! - [`SplitOutcome::TooFewFaces`]: zero or one triangle
//! - [`SplitOutcome::CapacityExceeded`]: more than `max_faces` triangles
//! - [`SplitOutcome::RetriesExhausted`]: every attempt left more than `max_parts` pieces
//!
//! # Error Handling
//!
//! Malformed input (out-of-range indices, NaN/infinite coordinates) and
//! invalid parameters are reported as [`MeshError`], which implements
//! [`miette::Diagnostic`].
//!
//! ```
//! use mesh_split::{ErrorCode, Mesh, MeshError};
//! use nalgebra::Point3;
//!
//! let mesh = Mesh::indexed(vec![Point3::origin(); 3], vec![[0, 1, 7]]);
//! match mesh.split_parts() {
//!     Err(e @ MeshError::InvalidVertexIndex { .. }) => {
//!         assert_eq!(e.code(), ErrorCode::InvalidVertexIndex);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! # Interop
//!
//! [`Mesh::from_flat`] and the `flat_*` accessors convert from and to the
//! flat `f32`/`u32` buffers used by loaders and GPU uploads.
//!
//! # Optional Features
//!
//! - `split-config`: serde support for [`SplitParams`] with TOML and JSON helpers

mod error;
mod types;

pub mod adjacency;
pub mod bounds;
pub mod components;
pub mod extract;
pub mod split;
pub mod tracing_ext;
pub mod validate;
pub mod weld;

// Re-export core types at crate root
pub use error::{ErrorCode, MeshError, MeshResult};
pub use types::{Mesh, Triangle};

pub use adjacency::VertexAdjacency;
pub use bounds::{Aabb, BoundingSphere};
pub use components::{ComponentAnalysis, Partition, find_connected_components, partition_faces};
pub use extract::{MeshPart, compute_vertex_normals, extract_component};
pub use split::{SplitOutcome, SplitParams, SplitResult, split_by_connectivity, split_mesh};
pub use validate::{DataValidation, validate_mesh_data};
pub use weld::{WeldResult, weld_vertices};

#[cfg(feature = "split-config")]
pub use split::SplitConfigError;

impl Mesh {
    /// Split into connected parts with default parameters.
    ///
    /// Returns the part meshes, largest first. A mesh that cannot be split
    /// comes back as a single part with the same triangles as `self`.
    pub fn split_parts(&self) -> MeshResult<Vec<Mesh>> {
        split::split_mesh(self)
    }

    /// Split into connected parts with custom parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_split::{Mesh, SplitOutcome, SplitParams};
    /// use nalgebra::Point3;
    ///
    /// let mesh = Mesh::indexed(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///         Point3::new(1.0, 1.0, 0.0),
    ///     ],
    ///     vec![[0, 1, 2], [1, 3, 2]],
    /// );
    ///
    /// let result = mesh.split_parts_with_params(&SplitParams::default()).unwrap();
    /// assert_eq!(result.outcome, SplitOutcome::Connected);
    /// // Same buffers as the input, plus normals.
    /// assert_eq!(result.parts[0].mesh.positions, mesh.positions);
    /// assert_eq!(result.parts[0].mesh.indices, mesh.indices);
    /// assert!(result.parts[0].mesh.normals.is_some());
    /// ```
    pub fn split_parts_with_params(&self, params: &SplitParams) -> MeshResult<SplitResult> {
        split::split_by_connectivity(self, params)
    }
}
