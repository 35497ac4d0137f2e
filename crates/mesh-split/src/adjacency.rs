//! Vertex-to-face adjacency.

/// Maps each vertex slot to the triangles that reference it.
///
/// Stored as one list per vertex, so lookups are plain array indexing.
#[derive(Debug, Clone)]
pub struct VertexAdjacency {
    vertex_to_faces: Vec<Vec<u32>>,
}

impl VertexAdjacency {
    /// Build adjacency information from a list of faces in one pass.
    ///
    /// Face indices that are `>= vertex_count` grow the table instead of
    /// panicking; callers are expected to validate indices beforehand.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_split::VertexAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = VertexAdjacency::build(&faces, 4);
    ///
    /// assert_eq!(adj.faces_for_vertex(1), &[0, 1]);
    /// assert_eq!(adj.faces_for_vertex(3), &[1]);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]], vertex_count: usize) -> Self {
        let mut vertex_to_faces: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                let v = v as usize;
                if v >= vertex_to_faces.len() {
                    vertex_to_faces.resize_with(v + 1, Vec::new);
                }
                let incident = &mut vertex_to_faces[v];
                // A collapsed face lists the same vertex more than once.
                if incident.last() != Some(&(face_idx as u32)) {
                    incident.push(face_idx as u32);
                }
            }
        }

        Self { vertex_to_faces }
    }

    /// Get faces adjacent to a vertex, in ascending face order.
    ///
    /// Returns an empty slice if the vertex has no adjacent faces.
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[u32] {
        self.vertex_to_faces
            .get(v as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of vertex slots in the table.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}
