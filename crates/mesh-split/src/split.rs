//! Connectivity-based splitting with adaptive weld tolerance.
//!
//! STL has no part metadata. The splitter welds near-coincident vertices,
//! labels connected components and cuts one sub-mesh per component. When the
//! weld leaves an implausible number of components (the usual symptom of
//! export noise) the tolerance is grown and the attempt repeated, a bounded
//! number of times. Whenever no sensible split is found the whole input comes
//! back as a single part.

use tracing::{debug, info, warn};

use crate::Mesh;
use crate::components::{Partition, partition_faces};
use crate::error::{MeshError, MeshResult};
use crate::extract::{MeshPart, compute_vertex_normals, extract_component};
use crate::tracing_ext::{OperationTimer, log_mesh_stats};
use crate::validate::validate_mesh_data;
use crate::weld::weld_vertices;

/// Configuration for [`split_by_connectivity`].
///
/// # Example
///
/// ```
/// use mesh_split::SplitParams;
///
/// // Use defaults (tolerance = 1% of the model diagonal)
/// let params = SplitParams::default();
///
/// // Or customize
/// let params = SplitParams {
///     merge_tolerance: Some(0.05),
///     max_parts: 50,
///     ..Default::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "split-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SplitParams {
    /// Distance below which vertices are welded on the first attempt.
    ///
    /// When `None`, the tolerance is `relative_tolerance` times the diagonal
    /// of the model's bounding box (or of a unit box for flat/empty models).
    ///
    /// Default: `None`
    pub merge_tolerance: Option<f64>,

    /// Fraction of the bounding diagonal used when `merge_tolerance` is unset.
    ///
    /// Default: `0.01`
    pub relative_tolerance: f64,

    /// Meshes with more triangles than this are returned unsplit.
    ///
    /// Flood fill over a huge mesh is CPU-bound; this keeps interactive
    /// callers responsive.
    ///
    /// Default: `250_000`
    pub max_faces: usize,

    /// Component counts above this are treated as a failed weld and retried
    /// with a larger tolerance.
    ///
    /// Default: `200`
    pub max_parts: usize,

    /// Number of weld + label attempts before giving up.
    ///
    /// Default: `6`
    pub max_attempts: usize,

    /// Factor applied to the tolerance after each rejected attempt.
    ///
    /// Default: `2.0`
    pub tolerance_growth: f64,

    /// Recompute part normals even when the source mesh has usable normals.
    ///
    /// Default: `false`
    pub recompute_normals: bool,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            merge_tolerance: None,
            relative_tolerance: 0.01,
            max_faces: 250_000,
            max_parts: 200,
            max_attempts: 6,
            tolerance_growth: 2.0,
            recompute_normals: false,
        }
    }
}

impl SplitParams {
    /// Params for CAD exports, where vertices are shared (almost) exactly.
    ///
    /// A tight tolerance keeps close but separate parts apart.
    pub fn for_cad() -> Self {
        Self {
            relative_tolerance: 1e-6,
            max_attempts: 3,
            ..Default::default()
        }
    }

    /// Params for scanned or heavily re-exported models with noisy vertices.
    pub fn for_scans() -> Self {
        Self {
            relative_tolerance: 0.02,
            max_attempts: 8,
            max_parts: 100,
            recompute_normals: true,
            ..Default::default()
        }
    }

    /// Set an explicit starting weld tolerance.
    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = Some(tolerance);
        self
    }

    /// Set the capacity guard.
    pub fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Set the component ceiling.
    pub fn with_max_parts(mut self, max_parts: usize) -> Self {
        self.max_parts = max_parts;
        self
    }

    /// Set the attempt bound.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the tolerance growth factor.
    pub fn with_tolerance_growth(mut self, growth: f64) -> Self {
        self.tolerance_growth = growth;
        self
    }

    /// Always recompute normals on extracted parts.
    pub fn with_recomputed_normals(mut self) -> Self {
        self.recompute_normals = true;
        self
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParams`] for negative or non-finite
    /// tolerances, a zero part ceiling or attempt bound, or a growth factor
    /// that would not grow the tolerance.
    pub fn validate(&self) -> MeshResult<()> {
        if let Some(tol) = self.merge_tolerance {
            if !tol.is_finite() || tol < 0.0 {
                return Err(MeshError::invalid_params(format!(
                    "merge_tolerance must be finite and >= 0, got {tol}"
                )));
            }
        }
        if !self.relative_tolerance.is_finite() || self.relative_tolerance < 0.0 {
            return Err(MeshError::invalid_params(format!(
                "relative_tolerance must be finite and >= 0, got {}",
                self.relative_tolerance
            )));
        }
        if self.max_parts == 0 {
            return Err(MeshError::invalid_params("max_parts must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(MeshError::invalid_params("max_attempts must be at least 1"));
        }
        if !self.tolerance_growth.is_finite() || self.tolerance_growth <= 1.0 {
            return Err(MeshError::invalid_params(format!(
                "tolerance_growth must be finite and > 1, got {}",
                self.tolerance_growth
            )));
        }
        Ok(())
    }

    /// Starting tolerance for a model with the given bounding diagonal.
    pub fn initial_tolerance(&self, diagonal: f64) -> f64 {
        self.merge_tolerance.unwrap_or_else(|| {
            let diagonal = if diagonal > 0.0 { diagonal } else { 1.0 };
            diagonal * self.relative_tolerance
        })
    }
}

/// Why a split ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The mesh was cut into `parts` pieces.
    Split { parts: usize },
    /// The mesh is a single connected component.
    Connected,
    /// Zero or one triangle; nothing to split.
    TooFewFaces,
    /// The capacity guard skipped splitting.
    CapacityExceeded { face_count: usize, max_faces: usize },
    /// Every attempt produced more than `max_parts` components.
    RetriesExhausted { last_component_count: usize },
}

/// Result of [`split_by_connectivity`].
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Parts ordered by bounding diagonal, largest first.
    ///
    /// For every outcome but [`SplitOutcome::Split`] this is the whole input as
    /// the only part: positions untouched, indexed, with normals. Only
    /// [`SplitOutcome::CapacityExceeded`] hands back the input exactly as given.
    pub parts: Vec<MeshPart>,
    /// How the split ended.
    pub outcome: SplitOutcome,
    /// Weld tolerance of the last attempt (0 if no attempt ran).
    pub merge_tolerance: f64,
    /// Number of weld + label attempts that ran.
    pub attempts: usize,
}

impl SplitResult {
    /// Number of parts returned.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Whether the mesh was actually cut into several parts.
    pub fn is_split(&self) -> bool {
        matches!(self.outcome, SplitOutcome::Split { .. })
    }

    /// Drop the cached bounds and keep only the meshes.
    pub fn into_meshes(self) -> Vec<Mesh> {
        self.parts.into_iter().map(|p| p.mesh).collect()
    }

    fn unsplit(
        mesh: &Mesh,
        outcome: SplitOutcome,
        merge_tolerance: f64,
        attempts: usize,
        recompute_normals: bool,
    ) -> Self {
        Self {
            parts: vec![whole_part(mesh, recompute_normals)],
            outcome,
            merge_tolerance,
            attempts,
        }
    }
}

/// Split a mesh into its connected components.
///
/// Runs up to `params.max_attempts` weld + label attempts. Each attempt welds
/// with the current tolerance and labels components over shared vertex slots:
///
/// - one component: the whole input is returned as one indexed part;
/// - `2..=max_parts` components: one part per component, sorted by bounding
///   diagonal (largest first, ties in discovery order);
/// - more than `max_parts`: the tolerance is multiplied by
///   `params.tolerance_growth` and the next attempt runs.
///
/// If all attempts are rejected the whole input is returned as one indexed
/// part as well. Parts always copy source positions, whatever the weld did.
/// A mesh with more than `params.max_faces` triangles is returned exactly as
/// given.
///
/// # Errors
///
/// Returns an error only for malformed input (out-of-range indices,
/// non-finite coordinates) or invalid `params`.
///
/// # Example
///
/// ```
/// use mesh_split::{Mesh, SplitParams, split_by_connectivity};
/// use nalgebra::Point3;
///
/// let mesh = Mesh::from_triangle_soup(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
///     Point3::new(12.0, 0.0, 0.0),
///     Point3::new(10.0, 2.0, 0.0),
/// ]);
///
/// let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
/// assert!(result.is_split());
/// assert_eq!(result.part_count(), 2);
/// // The larger triangle comes first.
/// assert_eq!(result.parts[0].mesh.positions[0], Point3::new(10.0, 0.0, 0.0));
/// ```
pub fn split_by_connectivity(mesh: &Mesh, params: &SplitParams) -> MeshResult<SplitResult> {
    params.validate()?;
    validate_mesh_data(mesh)?;

    let face_count = mesh.face_count();
    let timer = OperationTimer::start("split_by_connectivity", face_count, mesh.vertex_count());
    let _entered = timer.span().enter();
    log_mesh_stats(mesh, "split input");

    if face_count <= 1 {
        debug!("{} face(s), nothing to split", face_count);
        return Ok(SplitResult::unsplit(
            mesh,
            SplitOutcome::TooFewFaces,
            0.0,
            0,
            params.recompute_normals,
        ));
    }

    if face_count > params.max_faces {
        info!(
            "Skipping split: {} faces exceeds the {} face limit",
            face_count, params.max_faces
        );
        return Ok(SplitResult {
            parts: vec![MeshPart::whole(mesh.clone())],
            outcome: SplitOutcome::CapacityExceeded {
                face_count,
                max_faces: params.max_faces,
            },
            merge_tolerance: 0.0,
            attempts: 0,
        });
    }

    let mut tolerance = params.initial_tolerance(mesh.bounding_diagonal());
    let mut last_component_count = 0;

    for attempt in 1..=params.max_attempts {
        let welded = weld_vertices(mesh, tolerance);
        let indices = welded.mesh.indices.as_deref().unwrap_or_default();

        let partition = partition_faces(indices, welded.mesh.vertex_count(), params.max_parts);
        debug!(
            attempt,
            tolerance,
            merged = welded.merged_count,
            components = partition.component_count(),
            "Split attempt"
        );

        match partition {
            Partition::Connected => {
                info!(
                    "Mesh is a single connected component (attempt {}, tolerance {:.3e})",
                    attempt, tolerance
                );
                return Ok(SplitResult::unsplit(
                    mesh,
                    SplitOutcome::Connected,
                    tolerance,
                    attempt,
                    params.recompute_normals,
                ));
            }
            Partition::Split(components) => {
                // Welded slots only label faces; parts are cut from the source.
                let parts = extract_sorted(mesh, &components, params.recompute_normals);
                info!(
                    "Split mesh into {} parts (attempt {}, tolerance {:.3e})",
                    parts.len(),
                    attempt,
                    tolerance
                );
                return Ok(SplitResult {
                    outcome: SplitOutcome::Split { parts: parts.len() },
                    parts,
                    merge_tolerance: tolerance,
                    attempts: attempt,
                });
            }
            Partition::TooManyParts { discovered } => {
                last_component_count = discovered;
                if attempt < params.max_attempts {
                    debug!(
                        "More than {} components, growing tolerance {:.3e} → {:.3e}",
                        params.max_parts,
                        tolerance,
                        tolerance * params.tolerance_growth
                    );
                    tolerance *= params.tolerance_growth;
                }
            }
        }
    }

    warn!(
        "No split with at most {} parts after {} attempts; returning mesh as one part",
        params.max_parts, params.max_attempts
    );
    Ok(SplitResult::unsplit(
        mesh,
        SplitOutcome::RetriesExhausted {
            last_component_count,
        },
        tolerance,
        params.max_attempts,
        params.recompute_normals,
    ))
}

/// Split a mesh with default parameters, returning only the part meshes.
///
/// # Errors
///
/// Returns an error only for malformed input.
pub fn split_mesh(mesh: &Mesh) -> MeshResult<Vec<Mesh>> {
    split_by_connectivity(mesh, &SplitParams::default()).map(SplitResult::into_meshes)
}

/// The whole mesh as one part: indexed, with normals, positions untouched.
fn whole_part(mesh: &Mesh, recompute_normals: bool) -> MeshPart {
    if !mesh.is_indexed() {
        let all_faces: Vec<u32> = (0..mesh.face_count() as u32).collect();
        return extract_component(mesh, &all_faces, recompute_normals);
    }

    let mut whole = mesh.clone();
    if recompute_normals || whole.usable_normals().is_none() {
        compute_vertex_normals(&mut whole);
    }
    MeshPart::whole(whole)
}

/// Extract every component and order the parts largest first.
fn extract_sorted(mesh: &Mesh, components: &[Vec<u32>], recompute_normals: bool) -> Vec<MeshPart> {
    let mut parts: Vec<MeshPart> = components
        .iter()
        .map(|faces| extract_component(mesh, faces, recompute_normals))
        .collect();

    // Stable: equal diagonals keep discovery order.
    parts.sort_by(|a, b| b.bounding_diagonal().total_cmp(&a.bounding_diagonal()));
    parts
}

#[cfg(feature = "split-config")]
impl SplitParams {
    /// Load parameters from a TOML string. Missing fields take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, SplitConfigError> {
        let params: Self = toml::from_str(toml_str)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, SplitConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load parameters from a JSON string. Missing fields take their defaults.
    pub fn from_json(json_str: &str) -> Result<Self, SplitConfigError> {
        let params: Self = serde_json::from_str(json_str)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SplitConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors from loading or saving [`SplitParams`].
#[cfg(feature = "split-config")]
#[derive(Debug, thiserror::Error)]
pub enum SplitConfigError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The parameters parsed but are out of range.
    #[error(transparent)]
    Invalid(#[from] MeshError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn triangle_at(x: f64, size: f64) -> [Point3<f64>; 3] {
        [
            Point3::new(x, 0.0, 0.0),
            Point3::new(x + size, 0.0, 0.0),
            Point3::new(x, size, 0.0),
        ]
    }

    fn soup(triangles: &[[Point3<f64>; 3]]) -> Mesh {
        Mesh::from_triangle_soup(triangles.iter().flatten().copied().collect())
    }

    #[test]
    fn test_default_params() {
        let params = SplitParams::default();
        assert_eq!(params.merge_tolerance, None);
        assert_eq!(params.max_faces, 250_000);
        assert_eq!(params.max_parts, 200);
        assert_eq!(params.max_attempts, 6);
        assert_eq!(params.tolerance_growth, 2.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SplitParams::for_cad().validate().is_ok());
        assert!(SplitParams::for_scans().validate().is_ok());
        assert!(SplitParams::for_scans().recompute_normals);
    }

    #[test]
    fn test_invalid_params() {
        let cases = [
            SplitParams::default().with_merge_tolerance(-1.0),
            SplitParams::default().with_merge_tolerance(f64::NAN),
            SplitParams::default().with_max_parts(0),
            SplitParams::default().with_max_attempts(0),
            SplitParams::default().with_tolerance_growth(1.0),
            SplitParams {
                relative_tolerance: f64::INFINITY,
                ..Default::default()
            },
        ];
        for params in cases {
            let err = params.validate().unwrap_err();
            assert!(matches!(err, MeshError::InvalidParams { .. }), "{params:?}");
        }
    }

    #[test]
    fn test_initial_tolerance() {
        let params = SplitParams::default();
        assert_eq!(params.initial_tolerance(10.0), 0.1);
        // Degenerate extent falls back to a unit diagonal.
        assert_eq!(params.initial_tolerance(0.0), 0.01);
        assert_eq!(params.with_merge_tolerance(0.5).initial_tolerance(10.0), 0.5);
    }

    #[test]
    fn test_single_face_is_not_split() {
        let mesh = soup(&[triangle_at(0.0, 1.0)]);
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        assert_eq!(result.outcome, SplitOutcome::TooFewFaces);
        assert_eq!(result.attempts, 0);

        // Same triangle, now indexed and shaded.
        let part = &result.parts[0].mesh;
        assert_eq!(part.positions, mesh.positions);
        assert_eq!(part.indices, Some(vec![[0, 1, 2]]));
        assert_eq!(part.normals, Some(vec![nalgebra::Vector3::z(); 3]));
    }

    #[test]
    fn test_empty_mesh_is_not_split() {
        let result = split_by_connectivity(&Mesh::new(), &SplitParams::default()).unwrap();
        assert_eq!(result.outcome, SplitOutcome::TooFewFaces);
        assert_eq!(result.part_count(), 1);
    }

    #[test]
    fn test_parts_sorted_largest_first() {
        let mesh = soup(&[
            triangle_at(0.0, 1.0),
            triangle_at(10.0, 3.0),
            triangle_at(20.0, 2.0),
        ]);
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        assert_eq!(result.outcome, SplitOutcome::Split { parts: 3 });
        assert_eq!(result.attempts, 1);

        let firsts: Vec<f64> = result.parts.iter().map(|p| p.aabb.min.x).collect();
        assert_eq!(firsts, vec![10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_equal_sizes_keep_discovery_order() {
        let mesh = soup(&[triangle_at(30.0, 1.0), triangle_at(0.0, 1.0)]);
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        assert_eq!(result.parts[0].aabb.min.x, 30.0);
        assert_eq!(result.parts[1].aabb.min.x, 0.0);
    }

    #[test]
    fn test_capacity_guard() {
        let mesh = soup(&[triangle_at(0.0, 1.0), triangle_at(10.0, 1.0), triangle_at(20.0, 1.0)]);
        let params = SplitParams::default().with_max_faces(2);
        let result = split_by_connectivity(&mesh, &params).unwrap();
        assert_eq!(
            result.outcome,
            SplitOutcome::CapacityExceeded {
                face_count: 3,
                max_faces: 2
            }
        );
        assert_eq!(result.into_meshes(), vec![mesh]);
    }

    #[test]
    fn test_retries_exhausted_falls_back() {
        let mesh = soup(&[
            triangle_at(0.0, 1.0),
            triangle_at(100.0, 1.0),
            triangle_at(200.0, 1.0),
        ]);
        // Gaps of 99 units, far beyond what 3 doublings of 0.01 can bridge.
        let params = SplitParams::default()
            .with_merge_tolerance(0.01)
            .with_max_parts(2)
            .with_max_attempts(3);
        let result = split_by_connectivity(&mesh, &params).unwrap();

        assert_eq!(
            result.outcome,
            SplitOutcome::RetriesExhausted {
                last_component_count: 3
            }
        );
        assert_eq!(result.attempts, 3);
        assert_eq!(result.merge_tolerance, 0.04);
        assert_eq!(result.parts.len(), 1);

        let part = &result.parts[0];
        assert_eq!(part.mesh.positions, mesh.positions);
        assert!(part.mesh.is_indexed());
        assert_eq!(part.source_faces, vec![0, 1, 2]);
    }

    #[test]
    fn test_connected_indexed_input_keeps_its_buffers() {
        let mesh = Mesh::indexed(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(7.0, 7.0, 7.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let result = split_by_connectivity(&mesh, &SplitParams::default()).unwrap();
        assert_eq!(result.outcome, SplitOutcome::Connected);

        let part = &result.parts[0].mesh;
        assert_eq!(part.positions, mesh.positions);
        assert_eq!(part.indices, mesh.indices);
        assert_eq!(part.normals.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let mesh = Mesh::indexed(vec![Point3::origin(); 3], vec![[0, 1, 2], [0, 1, 5]]);
        let err = split_by_connectivity(&mesh, &SplitParams::default()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { .. }));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let mesh = soup(&[triangle_at(0.0, 1.0), triangle_at(10.0, 1.0)]);
        let params = SplitParams::default().with_max_parts(0);
        assert!(split_by_connectivity(&mesh, &params).is_err());
    }

    #[test]
    fn test_results_can_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mesh>();
        assert_send_sync::<SplitParams>();
        assert_send_sync::<SplitResult>();
    }

    #[test]
    fn test_split_mesh_convenience() {
        let mesh = soup(&[triangle_at(0.0, 1.0), triangle_at(10.0, 1.0)]);
        let parts = split_mesh(&mesh).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.is_indexed() && p.normals.is_some()));
    }

    #[cfg(feature = "split-config")]
    #[test]
    fn test_config_round_trip() {
        let params = SplitParams::for_scans().with_merge_tolerance(0.25);
        let toml_str = params.to_toml().unwrap();
        assert_eq!(SplitParams::from_toml(&toml_str).unwrap(), params);

        let json = params.to_json().unwrap();
        assert_eq!(SplitParams::from_json(&json).unwrap(), params);
    }

    #[cfg(feature = "split-config")]
    #[test]
    fn test_config_partial_and_invalid() {
        let params = SplitParams::from_toml("max_parts = 12\n").unwrap();
        assert_eq!(params.max_parts, 12);
        assert_eq!(params.max_attempts, 6);

        let err = SplitParams::from_json(r#"{"tolerance_growth": 0.5}"#).unwrap_err();
        assert!(matches!(err, SplitConfigError::Invalid(_)));
    }
}
