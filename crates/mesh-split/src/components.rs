//! Connected component labeling over the triangle graph.
//!
//! Two triangles are connected if they share a vertex slot. Labeling is an
//! iterative flood fill with an explicit stack, so meshes with hundreds of
//! thousands of faces cannot overflow the call stack.

use std::cmp::Reverse;

use tracing::{debug, info};

use crate::Mesh;
use crate::adjacency::VertexAdjacency;

/// Outcome of partitioning a face list into connected components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Every face belongs to one component (or there are no faces).
    Connected,
    /// Two or more components, each a list of face indices.
    ///
    /// Components appear in discovery order: each one is seeded by the lowest
    /// face index not claimed by an earlier component. Face indices within a
    /// component are ascending.
    Split(Vec<Vec<u32>>),
    /// Labeling stopped once the component count passed the limit.
    TooManyParts {
        /// Components found before stopping (limit + 1).
        discovered: usize,
    },
}

impl Partition {
    /// Number of components found (for `TooManyParts`, the count at which labeling stopped).
    pub fn component_count(&self) -> usize {
        match self {
            Partition::Connected => 1,
            Partition::Split(components) => components.len(),
            Partition::TooManyParts { discovered } => *discovered,
        }
    }
}

/// Partition faces into maximal sets connected through shared vertices.
///
/// `max_parts` bounds the work done on badly welded meshes: as soon as more
/// than `max_parts` components have been found, labeling stops and
/// [`Partition::TooManyParts`] is returned.
///
/// # Example
///
/// ```
/// use mesh_split::{Partition, partition_faces};
///
/// let faces = vec![[0, 1, 2], [3, 4, 5], [2, 6, 7]];
/// let partition = partition_faces(&faces, 8, 200);
/// assert_eq!(partition, Partition::Split(vec![vec![0, 2], vec![1]]));
/// ```
pub fn partition_faces(faces: &[[u32; 3]], vertex_count: usize, max_parts: usize) -> Partition {
    let face_count = faces.len();
    if face_count == 0 {
        return Partition::Connected;
    }

    let adjacency = VertexAdjacency::build(faces, vertex_count);
    let mut visited = vec![false; face_count];
    let mut components: Vec<Vec<u32>> = Vec::new();
    let mut stack: Vec<u32> = Vec::new();

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        stack.push(seed as u32);

        let mut component = Vec::new();
        while let Some(face_idx) = stack.pop() {
            component.push(face_idx);

            for &v in &faces[face_idx as usize] {
                for &neighbor in adjacency.faces_for_vertex(v) {
                    if !visited[neighbor as usize] {
                        visited[neighbor as usize] = true;
                        stack.push(neighbor);
                    }
                }
            }
        }

        // Single-component meshes skip the Split allocation entirely.
        if component.len() == face_count {
            return Partition::Connected;
        }

        component.sort_unstable();
        components.push(component);
        if components.len() > max_parts {
            debug!(
                "Stopped labeling after {} components (limit {})",
                components.len(),
                max_parts
            );
            return Partition::TooManyParts {
                discovered: components.len(),
            };
        }
    }

    Partition::Split(components)
}

/// Result of an unbounded component analysis.
#[derive(Debug, Clone)]
pub struct ComponentAnalysis {
    /// Number of connected components found.
    pub component_count: usize,
    /// Face indices for each component, sorted by face count (largest first).
    pub components: Vec<Vec<u32>>,
    /// Size of the largest component (number of faces).
    pub largest_component_size: usize,
    /// Size of the smallest component (number of faces).
    pub smallest_component_size: usize,
}

impl ComponentAnalysis {
    /// Check if the mesh is fully connected (single component).
    pub fn is_connected(&self) -> bool {
        self.component_count == 1
    }
}

impl std::fmt::Display for ComponentAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Component Analysis:")?;
        writeln!(f, "  Connected components: {}", self.component_count)?;
        if self.component_count > 0 {
            writeln!(
                f,
                "  Largest component: {} faces",
                self.largest_component_size
            )?;
            writeln!(
                f,
                "  Smallest component: {} faces",
                self.smallest_component_size
            )?;
        }
        Ok(())
    }
}

/// Find all connected components of a mesh as it is indexed, without welding.
///
/// Non-indexed meshes share no vertex slots, so every triangle is its own
/// component; weld first (see [`crate::weld_vertices`]) for a meaningful answer.
pub fn find_connected_components(mesh: &Mesh) -> ComponentAnalysis {
    let faces: Vec<[u32; 3]> = mesh.faces().collect();

    let mut components = match partition_faces(&faces, mesh.vertex_count(), usize::MAX) {
        Partition::Connected if faces.is_empty() => Vec::new(),
        Partition::Connected => vec![(0..faces.len() as u32).collect()],
        Partition::Split(components) => components,
        Partition::TooManyParts { .. } => unreachable!("no component limit was set"),
    };

    components.sort_by_key(|c| Reverse(c.len()));

    let component_count = components.len();
    let largest_component_size = components.first().map_or(0, Vec::len);
    let smallest_component_size = components.last().map_or(0, Vec::len);

    info!(
        "Found {} connected component(s) in mesh with {} faces",
        component_count,
        faces.len()
    );

    ComponentAnalysis {
        component_count,
        components,
        largest_component_size,
        smallest_component_size,
    }
}
