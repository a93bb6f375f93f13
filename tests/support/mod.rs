//! Test support library
//! Provides various helper functions & utilities for tests.

#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use stlbool::{
    Mesh, StlFormat,
    float_types::Real,
    io,
    mesh::{polygon::Polygon, vertex::Vertex},
};

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box(polygons: &[Polygon<()>]) -> [Real; 6] {
    let mut min = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut max = Point3::new(Real::MIN, Real::MIN, Real::MIN);
    for v in polygons.iter().flat_map(|p| &p.vertices) {
        min = min.inf(&v.pos);
        max = max.sup(&v.pos);
    }
    [min.x, min.y, min.z, max.x, max.y, max.z]
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None)
}

/// Write `mesh` as `name` inside `dir` and return the path.
pub fn write_mesh(dir: &Path, name: &str, mesh: &Mesh<()>, format: StlFormat) -> PathBuf {
    let path = dir.join(name);
    io::write_stl(mesh, &path, format).expect("test mesh can be written");
    path
}
