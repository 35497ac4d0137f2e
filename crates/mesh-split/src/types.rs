//! Core mesh data types.

use nalgebra::{Point3, Vector3};

use crate::bounds::{Aabb, BoundingSphere};
use crate::error::{MeshError, MeshResult};

/// A triangle mesh in the buffer layout used by STL decoders and viewers.
///
/// Positions are stored once per vertex. When `indices` is `None` the mesh is
/// non-indexed: every three consecutive positions form one triangle and any
/// trailing positions that do not complete a triangle are ignored.
///
/// `normals`, when present, run parallel to `positions`. A normals buffer of
/// the wrong length is ignored rather than trusted (see [`Mesh::usable_normals`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions; the position of a vertex in this list is its index.
    pub positions: Vec<Point3<f64>>,

    /// Optional per-vertex normals.
    pub normals: Option<Vec<Vector3<f64>>>,

    /// Optional index buffer. Each face is [v0, v1, v2] with counter-clockwise winding.
    pub indices: Option<Vec<[u32; 3]>>,
}

impl Mesh {
    /// Create a new empty (non-indexed) mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a non-indexed mesh ("triangle soup"), as STL files store it.
    pub fn from_triangle_soup(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            normals: None,
            indices: None,
        }
    }

    /// Create an indexed mesh.
    pub fn indexed(positions: Vec<Point3<f64>>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            normals: None,
            indices: Some(indices),
        }
    }

    /// Attach per-vertex normals.
    pub fn with_normals(mut self, normals: Vec<Vector3<f64>>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Build a mesh from flat `f32` buffers as handed over by a decoder or GPU layer.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::MalformedBuffer`] if a buffer length is not a
    /// multiple of three. Index values are not range-checked here; use
    /// [`crate::validate_mesh_data`] for that.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_split::Mesh;
    ///
    /// let mesh = Mesh::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None, None).unwrap();
    /// assert_eq!(mesh.face_count(), 1);
    /// assert!(!mesh.is_indexed());
    /// ```
    pub fn from_flat(
        positions: &[f32],
        normals: Option<&[f32]>,
        indices: Option<&[u32]>,
    ) -> MeshResult<Self> {
        let positions = flat_to_triplets("positions", positions)?
            .map(|[x, y, z]| Point3::new(x, y, z))
            .collect();

        let normals = normals
            .map(|n| {
                flat_to_triplets("normals", n)
                    .map(|it| it.map(|[x, y, z]| Vector3::new(x, y, z)).collect())
            })
            .transpose()?;

        let indices = indices
            .map(|idx| {
                if idx.len() % 3 != 0 {
                    return Err(MeshError::malformed_buffer("index", idx.len()));
                }
                Ok(idx.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
            })
            .transpose()?;

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles, implicit ones included for non-indexed meshes.
    #[inline]
    pub fn face_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len() / 3,
        }
    }

    /// Whether the mesh carries an index buffer.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Check if mesh is empty (no vertices or no triangles).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.face_count() == 0
    }

    /// Vertex indices of a face, synthesized for non-indexed meshes.
    ///
    /// # Panics
    ///
    /// Panics if `face_idx >= self.face_count()`.
    #[inline]
    pub fn face(&self, face_idx: usize) -> [u32; 3] {
        match &self.indices {
            Some(indices) => indices[face_idx],
            None => {
                let base = (face_idx * 3) as u32;
                [base, base + 1, base + 2]
            }
        }
    }

    /// Iterate over face vertex indices.
    pub fn faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.face_count()).map(move |f| self.face(f))
    }

    /// Get a specific triangle by face index.
    ///
    /// Returns `None` if the face does not exist or references a missing vertex.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        if face_idx >= self.face_count() {
            return None;
        }
        let [i0, i1, i2] = self.face(face_idx);
        Some(Triangle {
            v0: *self.positions.get(i0 as usize)?,
            v1: *self.positions.get(i1 as usize)?,
            v2: *self.positions.get(i2 as usize)?,
        })
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    ///
    /// Faces with out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.face_count()).filter_map(move |f| self.triangle(f))
    }

    /// Normals, if present and parallel to the positions.
    pub fn usable_normals(&self) -> Option<&[Vector3<f64>]> {
        self.normals
            .as_deref()
            .filter(|n| n.len() == self.positions.len())
    }

    /// Axis-aligned bounding box of all positions.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }

    /// Length of the bounding box diagonal; zero for empty meshes.
    pub fn bounding_diagonal(&self) -> f64 {
        self.aabb().diagonal()
    }

    /// Bounding sphere centered on the bounding box center.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_points(&self.positions)
    }

    /// Positions as a flat `f32` buffer.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Usable normals as a flat `f32` buffer.
    pub fn flat_normals(&self) -> Option<Vec<f32>> {
        self.usable_normals().map(|normals| {
            normals
                .iter()
                .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
                .collect()
        })
    }

    /// Index buffer as a flat list; `None` for non-indexed meshes.
    pub fn flat_indices(&self) -> Option<Vec<u32>> {
        self.indices
            .as_ref()
            .map(|indices| indices.iter().flatten().copied().collect())
    }
}

fn flat_to_triplets<'a>(
    buffer: &'static str,
    data: &'a [f32],
) -> MeshResult<impl Iterator<Item = [f64; 3]> + 'a> {
    if data.len() % 3 != 0 {
        return Err(MeshError::malformed_buffer(buffer, data.len()));
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| [f64::from(c[0]), f64::from(c[1]), f64::from(c[2])]))
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// Its length is twice the triangle area.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Vertices as an array, in winding order.
    #[inline]
    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}
