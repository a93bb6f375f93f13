//! Point merging and removal of collapsed polygons

use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::connectivity::VertexIndexMap;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::traits::CSG;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanParams {
    pub point_merging: bool,
    /// Merge distance; a fraction of the bounding-box diagonal unless
    /// `absolute_tolerance` is set
    pub tolerance: Real,
    pub absolute_tolerance: bool,
    pub convert_polys_to_lines: bool,
    pub convert_lines_to_points: bool,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            point_merging: true,
            tolerance: 0.0,
            absolute_tolerance: false,
            convert_polys_to_lines: true,
            convert_lines_to_points: true,
        }
    }
}

/// What a clean pass changed.
///
/// A surface mesh holds no lines or points, so polygons that collapse are
/// always dropped; the counters say what they would have become.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub merged_points: usize,
    pub polys_to_lines: usize,
    pub lines_to_points: usize,
    pub removed_polygons: usize,
}

impl CleanReport {
    /// Polygons that left the mesh for any reason
    pub const fn dropped(&self) -> usize {
        self.polys_to_lines + self.lines_to_points + self.removed_polygons
    }
}

/// Drop consecutive (and wrap-around) duplicate corners.
fn dedup_corners(vertices: &mut Vec<Vertex>) {
    vertices.dedup_by(|a, b| a.pos == b.pos);
    while vertices.len() > 1 && vertices.first().map(|v| v.pos) == vertices.last().map(|v| v.pos) {
        vertices.pop();
    }
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Merge coincident points and drop polygons that collapse to lines or points.
    pub fn clean(&self, params: &CleanParams) -> (Mesh<S>, CleanReport) {
        let mut report = CleanReport::default();

        let merge_distance = if params.absolute_tolerance {
            params.tolerance
        } else {
            let bb = self.bounding_box();
            params.tolerance * (bb.maxs - bb.mins).norm()
        };

        let mut exact = VertexIndexMap::new(0.0);
        let mut welded = VertexIndexMap::new(merge_distance);

        let mut polygons = Vec::with_capacity(self.polygons.len());
        for poly in &self.polygons {
            let mut vertices = poly.vertices.clone();
            if params.point_merging {
                for v in &mut vertices {
                    exact.get_or_create_index(v.pos);
                    let idx = welded.get_or_create_index(v.pos);
                    v.pos = welded.position(idx);
                }
            }
            dedup_corners(&mut vertices);

            match vertices.len() {
                n if n >= 3 => {
                    if vertices.len() == poly.vertices.len()
                        && vertices.iter().zip(&poly.vertices).all(|(a, b)| a.pos == b.pos)
                    {
                        polygons.push(poly.clone());
                    } else {
                        polygons.push(Polygon::new(vertices, poly.metadata.clone()));
                    }
                },
                2 if params.convert_polys_to_lines => report.polys_to_lines += 1,
                1 if params.convert_lines_to_points => report.lines_to_points += 1,
                _ => report.removed_polygons += 1,
            }
        }
        report.merged_points = exact.len() - welded.len();

        debug!(
            before = self.polygons.len(),
            after = polygons.len(),
            merged_points = report.merged_points,
            dropped = report.dropped(),
            "clean"
        );

        (Mesh::from_polygons(&polygons, self.metadata.clone()), report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn tri(points: [[Real; 3]; 3]) -> Polygon<()> {
        Polygon::new(
            points
                .iter()
                .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
                .collect(),
            None,
        )
    }

    #[test]
    fn closed_cube_is_untouched() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let (cleaned, report) = cube.clean(&CleanParams::default());
        assert_eq!(cleaned.polygons, cube.polygons);
        assert_eq!(report, CleanReport::default());
    }

    #[test]
    fn collapsed_triangles_are_reported() {
        let mesh: Mesh<()> = Mesh::from_polygons(
            &[
                tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                tri([[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
                tri([[2.0, 2.0, 2.0], [2.0, 2.0, 2.0], [2.0, 2.0, 2.0]]),
            ],
            None,
        );
        let (cleaned, report) = mesh.clean(&CleanParams::default());
        assert_eq!(cleaned.polygons.len(), 1);
        assert_eq!(report.polys_to_lines, 1);
        assert_eq!(report.lines_to_points, 1);
        assert_eq!(report.dropped(), 2);
    }

    #[test]
    fn tolerance_merges_close_points() {
        let mesh: Mesh<()> = Mesh::from_polygons(
            &[
                tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                tri([[1.0, 0.0, 0.0], [1.0 + 1e-9, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            ],
            None,
        );
        let params = CleanParams {
            tolerance: 1e-6,
            absolute_tolerance: true,
            ..Default::default()
        };
        let (cleaned, report) = mesh.clean(&params);
        assert_eq!(cleaned.polygons.len(), 1);
        assert_eq!(report.merged_points, 1);
        assert_eq!(report.polys_to_lines, 1);

        let (kept, _) = mesh.clean(&CleanParams {
            point_merging: false,
            ..Default::default()
        });
        assert_eq!(kept.polygons.len(), 2);
    }

    #[test]
    fn relative_tolerance_scales_with_the_bounding_box() {
        // diagonal ~1414, so a relative 1e-6 merges within ~1.4e-3
        let mesh: Mesh<()> = Mesh::from_polygons(
            &[
                tri([[0.0, 0.0, 0.0], [1000.0, 0.0, 0.0], [0.0, 1000.0, 0.0]]),
                tri([[0.0, 0.0, 0.0], [0.0005, 0.0, 0.0], [0.0, 1000.0, 0.0]]),
            ],
            None,
        );
        let relative = CleanParams {
            tolerance: 1e-6,
            ..Default::default()
        };
        let (cleaned, report) = mesh.clean(&relative);
        assert_eq!(report.merged_points, 1);
        assert_eq!(report.polys_to_lines, 1);
        assert_eq!(cleaned.polygons, vec![mesh.polygons[0].clone()]);

        let (kept, report) = mesh.clean(&CleanParams {
            absolute_tolerance: true,
            ..relative
        });
        assert_eq!(report, CleanReport::default());
        assert_eq!(kept.polygons.len(), 2);
    }
}
