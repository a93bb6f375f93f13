use crate::errors::ValidationError;
use crate::float_types::{Real, tolerance};
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct QuantizedPoint(i64, i64, i64);

fn quantize_point(p: &Point3<Real>, factor: Real) -> QuantizedPoint {
    QuantizedPoint(
        (p.x * factor).round() as i64,
        (p.y * factor).round() as i64,
        (p.z * factor).round() as i64,
    )
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// How many triangles use each undirected edge of the triangulated mesh.
    fn edge_use_counts(&self) -> HashMap<(QuantizedPoint, QuantizedPoint), u32> {
        let factor = 1.0 / tolerance();
        let mut edge_counts = HashMap::new();
        for tri in self.polygons.iter().flat_map(|p| p.triangulate()) {
            for (i0, i1) in [(0, 1), (1, 2), (2, 0)] {
                let p0 = quantize_point(&tri[i0].pos, factor);
                let p1 = quantize_point(&tri[i1].pos, factor);
                if p0 == p1 {
                    continue;
                }
                let key = if p0 < p1 { (p0, p1) } else { (p1, p0) };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }
        edge_counts
    }

    /// Checks if the Mesh object is manifold
    ///
    /// ### Returns
    /// Returns `true` if every edge of the triangulated mesh appears exactly 2 times
    ///
    /// Coordinates are compared on a grid of the weld [`tolerance`].
    pub fn is_manifold(&self) -> bool {
        self.edge_use_counts().values().all(|&count| count == 2)
    }

    /// Number of edges not shared by exactly two triangles.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_use_counts()
            .values()
            .filter(|&&count| count != 2)
            .count()
    }

    /// Check that every polygon is usable by the boolean engine.
    ///
    /// Open surfaces are reported last, after per-polygon problems.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let min_area = tolerance() * tolerance();
        for poly in &self.polygons {
            let first = poly.vertices.first().map(|v| v.pos).unwrap_or_else(Point3::origin);
            if poly.vertices.len() < 3 {
                return Err(ValidationError::TooFewPoints(first));
            }
            if let Some(v) = poly
                .vertices
                .iter()
                .find(|v| v.pos.coords.iter().any(|c| !c.is_finite()))
            {
                return Err(ValidationError::InvalidCoordinate(v.pos));
            }
            if poly.area() <= min_area {
                return Err(ValidationError::DegeneratePolygon(first));
            }
        }

        match self.boundary_edge_count() {
            0 => Ok(()),
            boundary_edges => Err(ValidationError::OpenSurface { boundary_edges }),
        }
    }
}
