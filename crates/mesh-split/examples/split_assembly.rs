//! Example: splitting a decoded STL assembly into parts
//!
//! Builds a small "assembly" the way an STL decoder would hand it over
//! (flat f32 buffers, three vertices per triangle, jittered seams), splits it,
//! and prints what a viewer would need per part.
//!
//! Run with: `RUST_LOG=mesh_split=debug cargo run --example split_assembly`

use mesh_split::{Mesh, SplitOutcome, SplitParams, split_by_connectivity};
use tracing_subscriber::EnvFilter;

const BOX_FACES: [[usize; 3]; 12] = [
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

/// Append an axis-aligned box as flat triangle soup.
///
/// `jitter` offsets every other triangle slightly, like a lossy exporter.
fn push_box(out: &mut Vec<f32>, min: [f32; 3], max: [f32; 3], jitter: f32) {
    let corners = [
        [min[0], min[1], min[2]],
        [max[0], min[1], min[2]],
        [max[0], max[1], min[2]],
        [min[0], max[1], min[2]],
        [min[0], min[1], max[2]],
        [max[0], min[1], max[2]],
        [max[0], max[1], max[2]],
        [min[0], max[1], max[2]],
    ];
    for (i, face) in BOX_FACES.iter().enumerate() {
        let offset = if i % 2 == 0 { 0.0 } else { jitter };
        for &c in face {
            out.extend(corners[c].map(|v| v + offset));
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Split Assembly Example");
    println!("======================\n");

    let mut flat = Vec::new();
    push_box(&mut flat, [0.0, 0.0, 0.0], [40.0, 20.0, 5.0], 0.002); // base plate
    push_box(&mut flat, [5.0, 5.0, 8.0], [15.0, 15.0, 30.0], 0.002); // post
    push_box(&mut flat, [25.0, 5.0, 8.0], [30.0, 10.0, 12.0], 0.0); // bolt head

    let mesh = match Mesh::from_flat(&flat, None, None) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("Bad buffers: {e}");
            return;
        }
    };
    println!("Input: {} triangles, {} vertices", mesh.face_count(), mesh.vertex_count());

    let params = SplitParams::default();
    let result = match split_by_connectivity(&mesh, &params) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Split failed [{}]: {e}", e.code());
            return;
        }
    };

    match result.outcome {
        SplitOutcome::Split { parts } => println!(
            "Split into {} parts (tolerance {:.4}, {} attempt(s))\n",
            parts, result.merge_tolerance, result.attempts
        ),
        other => println!("Not split: {other:?}\n"),
    }

    for (i, part) in result.parts.iter().enumerate() {
        let size = part.aabb.size();
        println!("Part {}:", i + 1);
        println!("  Triangles: {}", part.face_count());
        println!("  Vertices:  {}", part.mesh.vertex_count());
        println!("  Size:      {:.1} x {:.1} x {:.1}", size.x, size.y, size.z);
        println!(
            "  Sphere:    center ({:.1}, {:.1}, {:.1}), radius {:.2}",
            part.bounding_sphere.center.x,
            part.bounding_sphere.center.y,
            part.bounding_sphere.center.z,
            part.bounding_sphere.radius
        );
    }
}
