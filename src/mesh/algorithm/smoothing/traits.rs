//! Traits for mesh smoothing operations.

use crate::float_types::Real;
use crate::mesh::Mesh;
use serde::Deserialize;
use std::fmt::Debug;

/// Parameters of the Laplacian smoothing filter.
///
/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothingParams {
    pub iterations: usize,
    pub relaxation_factor: Real,
    /// Stop once no vertex moved more than this fraction of the bounding-box diagonal
    pub convergence: Real,
    pub boundary_smoothing: bool,
    pub feature_edge_smoothing: bool,
    pub feature_angle: Real,
    /// Vertices where two constraining edges meet at more than this angle stay fixed
    pub edge_angle: Real,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            iterations: 20,
            relaxation_factor: 0.01,
            convergence: 0.0,
            boundary_smoothing: true,
            feature_edge_smoothing: false,
            feature_angle: 45.0,
            edge_angle: 15.0,
        }
    }
}

impl SmoothingParams {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_relaxation_factor(mut self, relaxation_factor: Real) -> Self {
        self.relaxation_factor = relaxation_factor;
        self
    }

    pub fn with_boundary_smoothing(mut self, boundary_smoothing: bool) -> Self {
        self.boundary_smoothing = boundary_smoothing;
        self
    }

    pub fn with_feature_edge_smoothing(mut self, feature_edge_smoothing: bool) -> Self {
        self.feature_edge_smoothing = feature_edge_smoothing;
        self
    }
}

/// Trait for mesh smoothing operations.
pub trait SmoothingOps<S: Clone + Debug + Send + Sync> {
    /// Applies Laplacian smoothing to the mesh.
    fn laplacian_smooth(&self, mesh: &Mesh<S>, params: &SmoothingParams) -> Mesh<S>;
}
