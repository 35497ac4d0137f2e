//! Property-based tests for mesh splitting.
//!
//! These tests use proptest to generate random meshes and verify invariants.
//!
//! Run with: cargo test -p mesh-split -- proptest

use mesh_split::{Mesh, SplitOutcome, SplitParams, split_by_connectivity, weld_vertices};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// Generate a random vertex position in a bounded range.
fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Generate a triangle soup with the given number of triangles.
fn arb_soup(min_faces: usize, max_faces: usize) -> impl Strategy<Value = Mesh> {
    prop::collection::vec(prop::array::uniform3(arb_position()), min_faces..=max_faces).prop_map(
        |triangles| Mesh::from_triangle_soup(triangles.into_iter().flatten().collect()),
    )
}

/// Generate an indexed mesh whose faces only reference valid vertices.
fn arb_indexed(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = Mesh> {
    (3..=max_vertices).prop_flat_map(move |num_vertices| {
        let positions = prop::collection::vec(arb_position(), num_vertices);
        let face = prop::array::uniform3(0..num_vertices as u32);
        let faces = prop::collection::vec(face, 0..=max_faces);
        (positions, faces).prop_map(|(p, f)| Mesh::indexed(p, f))
    })
}

/// Cubes laid out along X, far enough apart that none of them touch.
///
/// Edges are at least 1.0 and the whole row spans at most ~60 units, so the
/// default 1%-of-diagonal tolerance never collapses a cube.
fn arb_cube_row() -> impl Strategy<Value = (Mesh, usize)> {
    prop::collection::vec(1.0..2.0f64, 1..=6).prop_map(|sizes| {
        let mut positions = Vec::new();
        for (i, &size) in sizes.iter().enumerate() {
            positions.extend(cube_soup(i as f64 * 10.0, size));
        }
        (Mesh::from_triangle_soup(positions), sizes.len())
    })
}

/// A grid patch as soup where every corner copy is nudged by up to `jitter`.
///
/// Copies of the same corner no longer compare equal, so the parts only hold
/// together through welding. Returns the patch and its cell size.
fn arb_jittered_patch() -> impl Strategy<Value = (Mesh, f64)> {
    (2usize..8, 0.1..2.0f64, 0.0..1e-3f64).prop_flat_map(|(cells, cell_size, jitter)| {
        let corners = cells * cells * 6;
        prop::collection::vec(prop::array::uniform3(-jitter..=jitter), corners).prop_map(
            move |offsets| {
                let mut positions = Vec::with_capacity(corners);
                for i in 0..cells {
                    for j in 0..cells {
                        let (x, y) = (i as f64 * cell_size, j as f64 * cell_size);
                        let s = cell_size;
                        positions.extend([
                            Point3::new(x, y, 0.0),
                            Point3::new(x + s, y, 0.0),
                            Point3::new(x + s, y + s, 0.0),
                            Point3::new(x, y, 0.0),
                            Point3::new(x + s, y + s, 0.0),
                            Point3::new(x, y + s, 0.0),
                        ]);
                    }
                }
                for (p, [dx, dy, dz]) in positions.iter_mut().zip(offsets) {
                    p.x += dx;
                    p.y += dy;
                    p.z += dz;
                }
                (Mesh::from_triangle_soup(positions), cell_size)
            },
        )
    })
}

fn cube_soup(x: f64, size: f64) -> Vec<Point3<f64>> {
    let c = [
        Point3::new(x, 0.0, 0.0),
        Point3::new(x + size, 0.0, 0.0),
        Point3::new(x + size, size, 0.0),
        Point3::new(x, size, 0.0),
        Point3::new(x, 0.0, size),
        Point3::new(x + size, 0.0, size),
        Point3::new(x + size, size, size),
        Point3::new(x, size, size),
    ];
    let faces = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    faces.iter().flat_map(|f| f.map(|i| c[i])).collect()
}

/// Every triangle of a mesh as bit patterns, sorted, for multiset comparison.
fn triangle_multiset(meshes: &[&Mesh]) -> Vec<[[u64; 3]; 3]> {
    let mut all: Vec<[[u64; 3]; 3]> = meshes
        .iter()
        .copied()
        .flat_map(Mesh::triangles)
        .map(|t| t.vertices().map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]))
        .collect();
    all.sort_unstable();
    all
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Separated cubes come back one part per cube with nothing lost.
    #[test]
    fn proptest_cube_rows_split_per_cube((mesh, cubes) in arb_cube_row()) {
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();

        if cubes == 1 {
            prop_assert_eq!(result.outcome, SplitOutcome::Connected);
        } else {
            prop_assert_eq!(result.outcome, SplitOutcome::Split { parts: cubes });
        }
        prop_assert_eq!(result.part_count(), cubes);

        for part in &result.parts {
            prop_assert_eq!(part.face_count(), 12);
            prop_assert_eq!(part.mesh.vertex_count(), 8);
        }

        // Exactly shared corners: the split is a partition of the input triangles.
        let parts: Vec<&Mesh> = result.parts.iter().map(|p| &p.mesh).collect();
        prop_assert_eq!(triangle_multiset(&parts), triangle_multiset(&[&mesh]));
    }

    /// Parts are ordered by bounding diagonal, largest first.
    #[test]
    fn proptest_parts_ordered_by_diagonal(mesh in arb_soup(2, 40)) {
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        let diagonals: Vec<f64> = result.parts.iter().map(|p| p.bounding_diagonal()).collect();
        prop_assert!(diagonals.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Either a real split that conserves faces, or the whole input as one part.
    #[test]
    fn proptest_split_or_whole(
        mesh in arb_soup(0, 40),
        max_parts in 1usize..10,
        max_attempts in 1usize..5,
    ) {
        let params = SplitParams::default()
            .with_max_parts(max_parts)
            .with_max_attempts(max_attempts);
        let result = split_by_connectivity(&mesh, &params).unwrap();

        prop_assert!(result.attempts <= max_attempts);

        if result.is_split() {
            prop_assert!(result.part_count() >= 2);
            prop_assert!(result.part_count() <= max_parts);

            let total: usize = result.parts.iter().map(|p| p.face_count()).sum();
            prop_assert_eq!(total, mesh.face_count());

            let mut seen: Vec<u32> = result
                .parts
                .iter()
                .flat_map(|p| p.source_faces.iter().copied())
                .collect();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), mesh.face_count());

            // Parts share no welded slot, and their welded slots sit at least
            // the final tolerance apart.
            let welded = weld_vertices(&mesh, result.merge_tolerance).mesh;
            let slots_of = |faces: &[u32]| -> Vec<u32> {
                let mut slots: Vec<u32> = faces.iter().flat_map(|&f| welded.face(f as usize)).collect();
                slots.sort_unstable();
                slots.dedup();
                slots
            };
            let part_slots: Vec<Vec<u32>> =
                result.parts.iter().map(|p| slots_of(&p.source_faces)).collect();
            for (i, a) in part_slots.iter().enumerate() {
                for b in &part_slots[i + 1..] {
                    for &sa in a {
                        for &sb in b {
                            prop_assert_ne!(sa, sb);
                            let gap = (welded.positions[sa as usize] - welded.positions[sb as usize]).norm();
                            prop_assert!(gap >= result.merge_tolerance);
                        }
                    }
                }
            }
        } else {
            prop_assert_eq!(result.part_count(), 1);
            prop_assert!(result.parts[0].mesh.is_indexed());
            prop_assert_eq!(result.parts[0].face_count(), mesh.face_count());
        }

        // Whatever happened, the output triangles are exactly the input triangles.
        let parts: Vec<&Mesh> = result.parts.iter().map(|p| &p.mesh).collect();
        prop_assert_eq!(triangle_multiset(&parts), triangle_multiset(&[&mesh]));
    }

    /// Jittered seams weld together but every nudged corner comes back as it was.
    #[test]
    fn proptest_jittered_patches_conserve_triangles(
        patches in prop::collection::vec(arb_jittered_patch(), 1..=3),
    ) {
        // Lay the patches out along X, 50 units apart.
        let mut positions = Vec::new();
        for (k, (patch, _)) in patches.iter().enumerate() {
            positions.extend(patch.positions.iter().map(|p| p + nalgebra::Vector3::x() * (k as f64 * 50.0)));
        }
        let mesh = Mesh::from_triangle_soup(positions);

        // Wide enough to catch every nudged copy, too narrow to reach a
        // neighboring grid corner.
        let min_cell = patches.iter().map(|(_, cell)| *cell).fold(f64::INFINITY, f64::min);
        let params = SplitParams::default().with_merge_tolerance(min_cell * 0.25);
        let result = split_by_connectivity(&mesh, &params).unwrap();
        prop_assert_eq!(result.part_count(), patches.len());

        let parts: Vec<&Mesh> = result.parts.iter().map(|p| &p.mesh).collect();
        prop_assert_eq!(triangle_multiset(&parts), triangle_multiset(&[&mesh]));

        let area = |meshes: &[&Mesh]| -> f64 {
            meshes.iter().copied().flat_map(Mesh::triangles).map(|t| t.area()).sum()
        };
        let (input_area, output_area) = (area(&[&mesh]), area(&parts));
        prop_assert!((input_area - output_area).abs() <= 1e-9 * input_area.max(1.0));
    }

    /// Part meshes are self-contained: valid indices, no unused vertices, normals per vertex.
    #[test]
    fn proptest_parts_are_compact(mesh in arb_indexed(30, 40)) {
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        if !result.is_split() {
            return Ok(());
        }

        for part in &result.parts {
            let vcount = part.mesh.vertex_count();
            let mut used = vec![false; vcount];
            for face in part.mesh.faces() {
                for v in face {
                    prop_assert!((v as usize) < vcount);
                    used[v as usize] = true;
                }
            }
            prop_assert!(used.iter().all(|&u| u));
            prop_assert_eq!(part.mesh.normals.as_ref().map(Vec::len), Some(vcount));
            for p in &part.mesh.positions {
                prop_assert!(part.bounding_sphere.contains(p));
            }
        }
    }

    /// The capacity guard returns the input untouched.
    #[test]
    fn proptest_capacity_guard(mesh in arb_soup(2, 30), max_faces in 0usize..30) {
        let params = SplitParams::default().with_max_faces(max_faces);
        let result = split_by_connectivity(&mesh, &params).unwrap();

        if mesh.face_count() > max_faces {
            prop_assert_eq!(
                result.outcome,
                SplitOutcome::CapacityExceeded { face_count: mesh.face_count(), max_faces }
            );
            prop_assert_eq!(result.attempts, 0);
            prop_assert_eq!(&result.parts[0].mesh, &mesh);
        }
    }
}
