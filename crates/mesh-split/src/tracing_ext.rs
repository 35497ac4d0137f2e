//! Tracing helpers for split operations.
//!
//! Everything here emits through `tracing`; nothing is printed unless the
//! application installs a subscriber:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_split=debug for per-attempt details,
//! // RUST_LOG=mesh_split::timing=info for timings only.
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: mismatched normals, fallback after exhausting retries
//! - **INFO**: split summaries, timing
//! - **DEBUG**: weld and labeling details per attempt

use std::time::Instant;
use tracing::{Span, debug, info};

use crate::Mesh;

/// Span plus wall clock for one split operation.
///
/// Enter [`OperationTimer::span`] for the duration of the work so every event
/// logged meanwhile carries the operation, face and vertex counts. The
/// elapsed time is logged inside the same span when the timer drops.
///
/// # Example
///
/// ```
/// use mesh_split::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let timer = OperationTimer::start("expensive_operation", 12, 8);
///     let _entered = timer.span().enter();
///     // ... do work ...
/// } // Timer logs duration when dropped
/// # expensive_operation();
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Open the operation span and start the clock.
    pub fn start(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "split_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        );
        debug!(
            target: "mesh_split::timing",
            parent: &span,
            operation = name,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer was started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The operation span.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            target: "mesh_split::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log mesh size and extent at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let dims = mesh.aabb().size();

    debug!(
        target: "mesh_split::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        indexed = mesh.is_indexed(),
        has_normals = mesh.usable_normals().is_some(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}
