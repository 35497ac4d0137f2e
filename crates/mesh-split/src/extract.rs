//! Sub-mesh extraction: one standalone mesh per connected component.

use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::debug;

use crate::bounds::{Aabb, BoundingSphere};
use crate::{Mesh, Triangle};

/// Identity of an output vertex during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VertexKey {
    /// Source vertex slot of an indexed mesh.
    Slot(u32),
    /// Bit pattern of a soup corner's position.
    Position([u64; 3]),
}

/// A standalone part cut out of a larger mesh.
///
/// The mesh is always indexed and always carries normals. Bounding volumes
/// are computed once at extraction.
#[derive(Debug, Clone)]
pub struct MeshPart {
    /// The part geometry, indices renumbered from 0.
    pub mesh: Mesh,
    /// Axis-aligned bounds of the part.
    pub aabb: Aabb,
    /// Bounding sphere of the part.
    pub bounding_sphere: BoundingSphere,
    /// Face indices in the source mesh this part was built from.
    pub source_faces: Vec<u32>,
}

impl MeshPart {
    /// Wrap a whole mesh as a single part, computing its bounds.
    pub fn whole(mesh: Mesh) -> Self {
        let aabb = mesh.aabb();
        let bounding_sphere = mesh.bounding_sphere();
        let source_faces = (0..mesh.face_count() as u32).collect();
        Self {
            mesh,
            aabb,
            bounding_sphere,
            source_faces,
        }
    }

    /// Length of the bounding box diagonal.
    #[inline]
    pub fn bounding_diagonal(&self) -> f64 {
        self.aabb.diagonal()
    }

    /// Number of triangles in the part.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }
}

/// Build a standalone mesh from a subset of a mesh's faces.
///
/// Positions and normals are copied from `mesh` untouched, so the parts of a
/// split together reproduce the source geometry. Vertices get new indices in
/// first-seen order while walking `faces`. Indexed input keeps one output
/// vertex per referenced source slot; triangle soup shares a vertex between
/// corners whose positions are bit-identical.
///
/// Source normals are carried over when they are usable; otherwise, or when
/// `recompute_normals` is set, normals are recomputed from the part's own
/// faces.
///
/// # Panics
///
/// Panics if a face index is out of range or a face references a missing
/// vertex. [`crate::split_by_connectivity`] validates its input first.
///
/// # Example
///
/// ```
/// use mesh_split::{Mesh, extract_component};
/// use nalgebra::Point3;
///
/// let mesh = Mesh::indexed(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(5.0, 0.0, 0.0),
///         Point3::new(6.0, 0.0, 0.0),
///         Point3::new(5.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [3, 4, 5]],
/// );
///
/// let part = extract_component(&mesh, &[1], false);
/// assert_eq!(part.mesh.indices, Some(vec![[0, 1, 2]]));
/// assert_eq!(part.mesh.positions[0], Point3::new(5.0, 0.0, 0.0));
/// assert!(part.mesh.normals.is_some());
/// ```
pub fn extract_component(mesh: &Mesh, faces: &[u32], recompute_normals: bool) -> MeshPart {
    let source_normals = if recompute_normals {
        None
    } else {
        mesh.usable_normals()
    };
    let indexed = mesh.is_indexed();

    let mut vertex_map: HashMap<VertexKey, u32> = HashMap::with_capacity(faces.len() * 3 / 2);
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::with_capacity(faces.len());

    for &face_idx in faces {
        let face = mesh.face(face_idx as usize);
        let mut local = [0u32; 3];
        for (slot, &old_idx) in local.iter_mut().zip(face.iter()) {
            let source = &mesh.positions[old_idx as usize];
            let key = if indexed {
                VertexKey::Slot(old_idx)
            } else {
                VertexKey::Position([source.x.to_bits(), source.y.to_bits(), source.z.to_bits()])
            };
            *slot = *vertex_map.entry(key).or_insert_with(|| {
                positions.push(*source);
                if let Some(src) = source_normals {
                    normals.push(src[old_idx as usize]);
                }
                (positions.len() - 1) as u32
            });
        }
        indices.push(local);
    }

    let mut part_mesh = Mesh {
        positions,
        normals: source_normals.map(|_| normals),
        indices: Some(indices),
    };
    if part_mesh.normals.is_none() {
        compute_vertex_normals(&mut part_mesh);
    }

    debug!(
        "Extracted part: {} vertices, {} faces",
        part_mesh.vertex_count(),
        part_mesh.face_count()
    );

    let aabb = part_mesh.aabb();
    let bounding_sphere = part_mesh.bounding_sphere();
    MeshPart {
        mesh: part_mesh,
        aabb,
        bounding_sphere,
        source_faces: faces.to_vec(),
    }
}

/// Compute vertex normals as the area-weighted average of adjacent face normals.
///
/// Vertices touched only by degenerate faces (or by none) get a zero normal,
/// so the normals buffer always stays parallel to the positions.
pub fn compute_vertex_normals(mesh: &mut Mesh) {
    let mut normal_accum: Vec<Vector3<f64>> = vec![Vector3::zeros(); mesh.vertex_count()];

    for face in mesh.faces() {
        let tri = Triangle::new(
            mesh.positions[face[0] as usize],
            mesh.positions[face[1] as usize],
            mesh.positions[face[2] as usize],
        );

        // Unnormalized normal has length 2*area, which gives area weighting.
        let weighted_normal = tri.normal_unnormalized();

        normal_accum[face[0] as usize] += weighted_normal;
        normal_accum[face[1] as usize] += weighted_normal;
        normal_accum[face[2] as usize] += weighted_normal;
    }

    for accum in &mut normal_accum {
        let len_sq = accum.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            *accum /= len_sq.sqrt();
        } else {
            *accum = Vector3::zeros();
        }
    }

    mesh.normals = Some(normal_accum);
}
