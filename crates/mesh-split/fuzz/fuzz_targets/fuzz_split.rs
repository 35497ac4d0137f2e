#![no_main]

use libfuzzer_sys::fuzz_target;
use mesh_split::{Mesh, SplitParams, split_by_connectivity};

fuzz_target!(|data: &[u8]| {
    // First byte picks indexed vs soup, the rest is raw little-endian f32/u32 data.
    let Some((&mode, rest)) = data.split_first() else {
        return;
    };

    let words: Vec<[u8; 4]> = rest
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    let split_at = (words.len() / 2) / 3 * 3;

    let positions: Vec<f32> = words[..split_at]
        .iter()
        .map(|w| f32::from_le_bytes(*w))
        .collect();
    let indices: Vec<u32> = words[split_at..]
        .iter()
        .map(|w| u32::from_le_bytes(*w) % 64)
        .take((words.len() - split_at) / 3 * 3)
        .collect();

    let mesh = if mode & 1 == 0 {
        Mesh::from_flat(&positions, None, None)
    } else {
        Mesh::from_flat(&positions, None, Some(&indices))
    };
    let Ok(mesh) = mesh else {
        return;
    };

    // Malformed input must come back as an error, never a panic.
    let params = SplitParams::default().with_max_parts(usize::from(mode >> 1).max(1));
    if let Ok(result) = split_by_connectivity(&mesh, &params) {
        assert!(!result.parts.is_empty());
        let faces: usize = result.parts.iter().map(|p| p.face_count()).sum();
        assert_eq!(faces, mesh.face_count());
        for part in &result.parts {
            assert!(part.mesh.is_indexed());
            assert!(part.mesh.positions.iter().all(|p| mesh.positions.contains(p)));
        }
    }
});
