//! Preprocessing chain run on boolean inputs that fail as read:
//! normals → smoothing → clean → triangulate → clean → normals.

use crate::mesh::Mesh;
use crate::mesh::algorithm::{
    CleanParams, NormalsParams, SerialSmoothingOps, SmoothingOps, SmoothingParams,
};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

/// Settings for every stage; `Default` matches the stock test driver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessParams {
    pub normals: NormalsParams,
    pub smoothing: SmoothingParams,
    pub clean: CleanParams,
}

pub fn preprocess<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    params: &PreprocessParams,
) -> Mesh<S> {
    debug!(polygons = mesh.polygons.len(), "preprocess: input");

    let normals = mesh.compute_normals(&params.normals);
    debug!(polygons = normals.polygons.len(), "preprocess: normals");

    let smoothed = SerialSmoothingOps::new().laplacian_smooth(&normals, &params.smoothing);
    debug!(polygons = smoothed.polygons.len(), "preprocess: smoothing");

    let (cleaned, report) = smoothed.clean(&params.clean);
    debug!(polygons = cleaned.polygons.len(), ?report, "preprocess: clean");

    let triangulated = cleaned.triangulate();
    debug!(polygons = triangulated.polygons.len(), "preprocess: triangulate");

    let (cleaned, report) = triangulated.clean(&params.clean);
    debug!(polygons = cleaned.polygons.len(), ?report, "preprocess: clean");

    let out = cleaned.compute_normals(&params.normals);
    debug!(polygons = out.polygons.len(), "preprocess: normals");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_stock_filters() {
        let params = PreprocessParams::default();
        assert!(params.normals.compute_point_normals);
        assert!(params.normals.consistency);
        assert!(!params.normals.auto_orient);
        assert_eq!(params.smoothing.iterations, 20);
        assert!(params.clean.point_merging);
        assert_eq!(params.clean.tolerance, 0.0);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let params: PreprocessParams = toml::from_str(
            r#"
            [smoothing]
            iterations = 5
            "#,
        )
        .expect("valid preprocess table");
        assert_eq!(params.smoothing.iterations, 5);
        assert_eq!(params.smoothing.relaxation_factor, 0.01);
        assert_eq!(params.normals, NormalsParams::default());
    }

    #[test]
    fn cube_comes_out_triangulated_and_closed() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let out = preprocess(&cube, &PreprocessParams::default());
        assert_eq!(out.polygons.len(), 12);
        assert!(out.polygons.iter().all(|p| p.vertices.len() == 3));
        assert!(out.is_manifold());
        assert!(out.signed_volume() > 0.0);
    }
}
