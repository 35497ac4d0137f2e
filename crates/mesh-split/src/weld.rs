//! Vertex welding: turn any mesh into an indexed mesh with shared vertices.
//!
//! STL exports rarely share vertices exactly, so connectivity has to be
//! computed on welded vertex slots rather than on raw coordinates.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::Mesh;

/// Result of welding a mesh.
#[derive(Debug, Clone)]
pub struct WeldResult {
    /// The welded mesh. Always indexed, one face per source face, same order.
    pub mesh: Mesh,
    /// Number of source vertices folded into another vertex.
    pub merged_count: usize,
    /// Tolerance the weld ran with.
    pub tolerance: f64,
}

/// Weld vertices that are closer than `tolerance` to a cluster seed.
///
/// Non-indexed input is treated as one vertex per position. Indexed input is
/// welded as well, so a retry with a larger tolerance always has an effect.
///
/// Vertices are visited in source order. A vertex not yet claimed becomes a
/// seed and claims every later unclaimed vertex closer than `tolerance`.
/// Claimed vertices never claim others, so merges do not chain: seeds stay at
/// least `tolerance` apart and every merged vertex lies within `tolerance` of
/// its seed. The seed keeps its own position and normal. Output vertices are
/// the seeds in ascending source order.
///
/// The welded positions are only used to label connectivity.
/// [`crate::split_by_connectivity`] cuts parts out of the source geometry.
///
/// Triangles that collapse onto two or fewer slots are kept, so no face is
/// lost; they simply link their surviving vertices.
///
/// A tolerance of zero (or less) welds only positions that compare equal.
///
/// Uses a spatial hash with cells as wide as the tolerance. Seeds are
/// `tolerance` apart, so only a bounded number of them scan any one cell and
/// a dense cluster costs linear time.
///
/// # Example
///
/// ```
/// use mesh_split::{Mesh, weld_vertices};
/// use nalgebra::Point3;
///
/// // Two triangles sharing an edge, stored as triangle soup.
/// let mesh = Mesh::from_triangle_soup(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]);
///
/// let welded = weld_vertices(&mesh, 1e-6);
/// assert_eq!(welded.mesh.vertex_count(), 4);
/// assert_eq!(welded.merged_count, 2);
/// ```
pub fn weld_vertices(mesh: &Mesh, tolerance: f64) -> WeldResult {
    let vertex_count = mesh.vertex_count();

    let seeds = if tolerance > 0.0 {
        seed_within_tolerance(&mesh.positions, tolerance)
    } else {
        seed_exact(&mesh.positions)
    };

    // Compact seeds in ascending source order.
    let mut compact: Vec<u32> = vec![u32::MAX; vertex_count];
    let mut positions = Vec::new();
    let source_normals = mesh.usable_normals();
    let mut normals = source_normals.map(|_| Vec::new());

    for (idx, &seed) in seeds.iter().enumerate() {
        if seed as usize == idx {
            compact[idx] = positions.len() as u32;
            positions.push(mesh.positions[idx]);
            if let (Some(out), Some(src)) = (normals.as_mut(), source_normals) {
                out.push(src[idx]);
            }
        }
    }

    let indices: Vec<[u32; 3]> = mesh
        .faces()
        .map(|face| face.map(|v| compact[seeds[v as usize] as usize]))
        .collect();

    let merged_count = vertex_count - positions.len();

    debug!(
        "Welded {} vertices (tolerance = {:.3e}): {} → {}",
        merged_count,
        tolerance,
        vertex_count,
        positions.len()
    );

    WeldResult {
        mesh: Mesh {
            positions,
            normals,
            indices: Some(indices),
        },
        merged_count,
        tolerance,
    }
}

/// Map every vertex to the seed that claimed it (seeds map to themselves).
fn seed_within_tolerance(positions: &[Point3<f64>], tolerance: f64) -> Vec<u32> {
    const UNCLAIMED: u32 = u32::MAX;

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, p) in positions.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(p, tolerance))
            .or_default()
            .push(idx as u32);
    }

    let mut seeds = vec![UNCLAIMED; positions.len()];
    for (idx, p) in positions.iter().enumerate() {
        if seeds[idx] != UNCLAIMED {
            continue;
        }
        let seed = idx as u32;
        seeds[idx] = seed;
        let cell = pos_to_cell(p, tolerance);

        // Check 3x3x3 neighborhood
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    // Saturated cells (huge coordinates, tiny tolerance) may wrap;
                    // the distance check below still decides.
                    let neighbor_cell = (
                        cell.0.wrapping_add(dx),
                        cell.1.wrapping_add(dy),
                        cell.2.wrapping_add(dz),
                    );
                    let Some(candidates) = spatial_hash.get(&neighbor_cell) else {
                        continue;
                    };
                    for &other_idx in candidates {
                        // Earlier unclaimed vertices are seeds that already
                        // found this one out of reach.
                        let other = other_idx as usize;
                        if other_idx <= seed || seeds[other] != UNCLAIMED {
                            continue;
                        }
                        if (p - positions[other]).norm() < tolerance {
                            seeds[other] = seed;
                        }
                    }
                }
            }
        }
    }
    seeds
}

/// Map every vertex to the first vertex with an equal position.
fn seed_exact(positions: &[Point3<f64>]) -> Vec<u32> {
    let mut first_seen: HashMap<[u64; 3], u32> = HashMap::with_capacity(positions.len());
    positions
        .iter()
        .enumerate()
        .map(|(idx, p)| *first_seen.entry(exact_key(p)).or_insert(idx as u32))
        .collect()
}

/// Position as an exact hash key, with `-0.0` folded onto `0.0`.
#[inline]
fn exact_key(p: &Point3<f64>) -> [u64; 3] {
    [exact_bits(p.x), exact_bits(p.y), exact_bits(p.z)]
}

/// Bit pattern used as an exact hash key, with `-0.0` folded onto `0.0`.
#[inline]
fn exact_bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

/// Convert position to spatial hash cell.
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}
