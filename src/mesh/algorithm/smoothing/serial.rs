//! Serial implementation of mesh smoothing.

use super::traits::{SmoothingOps, SmoothingParams};
use crate::float_types::{Real, tolerance};
use crate::mesh::Mesh;
use crate::mesh::connectivity::Connectivity;
use crate::traits::CSG;
use nalgebra::Point3;
use std::fmt::Debug;
use tracing::trace;

/// Serial implementation of `SmoothingOps`.
pub struct SerialSmoothingOps;

impl Default for SerialSmoothingOps {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialSmoothingOps {
    pub const fn new() -> Self {
        Self
    }
}

/// Which neighbours a vertex averages over.
#[derive(Debug, Clone, PartialEq)]
enum VertexKind {
    Fixed,
    Smooth(Vec<usize>),
}

/// Classify every welded vertex of `conn`.
///
/// Boundary edges, edges shared by more than two faces, and (optionally)
/// sharp feature edges constrain their vertices to move along them.
fn classify_vertices<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    conn: &Connectivity,
    params: &SmoothingParams,
) -> Vec<VertexKind> {
    let n = conn.vertex_map.len();
    let mut edge_neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut on_boundary = vec![false; n];
    let cos_feature = params.feature_angle.to_radians().cos();

    for ((a, b), faces) in conn.edge_faces() {
        let constraining = match faces.len() {
            1 => {
                on_boundary[a] = true;
                on_boundary[b] = true;
                true
            },
            2 => {
                params.feature_edge_smoothing && {
                    let n0 = mesh.polygons[faces[0]].plane.normal();
                    let n1 = mesh.polygons[faces[1]].plane.normal();
                    n0.dot(&n1) < cos_feature
                }
            },
            _ => true,
        };
        if constraining {
            edge_neighbors[a].push(b);
            edge_neighbors[b].push(a);
        }
    }

    let cos_edge = params.edge_angle.to_radians().cos();
    (0..n)
        .map(|v| {
            let Some(neighbors) = conn.adjacency.get(&v) else {
                return VertexKind::Fixed;
            };
            let constrained = &edge_neighbors[v];
            if constrained.is_empty() {
                return VertexKind::Smooth(neighbors.clone());
            }
            if on_boundary[v] && !params.boundary_smoothing {
                return VertexKind::Fixed;
            }
            if constrained.len() != 2 {
                return VertexKind::Fixed;
            }

            // a corner along the constraining polyline stays put
            let x1 = conn.vertex_map.position(constrained[0]);
            let x2 = conn.vertex_map.position(v);
            let x3 = conn.vertex_map.position(constrained[1]);
            let (l1, l2) = (x2 - x1, x3 - x2);
            match (l1.try_normalize(Real::EPSILON), l2.try_normalize(Real::EPSILON)) {
                (Some(l1), Some(l2)) if l1.dot(&l2) >= cos_edge => {
                    VertexKind::Smooth(constrained.clone())
                },
                _ => VertexKind::Fixed,
            }
        })
        .collect()
}

impl<S: Clone + Debug + Send + Sync> SmoothingOps<S> for SerialSmoothingOps {
    fn laplacian_smooth(&self, mesh: &Mesh<S>, params: &SmoothingParams) -> Mesh<S> {
        if mesh.is_empty() || params.iterations == 0 {
            return mesh.clone();
        }

        let conn = mesh.build_connectivity(tolerance());
        let kinds = classify_vertices(mesh, &conn, params);
        let mut positions = conn.vertex_map.positions.clone();

        let bb = mesh.bounding_box();
        let threshold = params.convergence * (bb.maxs - bb.mins).norm();

        for iteration in 0..params.iterations {
            let mut max_step: Real = 0.0;
            let updated: Vec<Point3<Real>> = positions
                .iter()
                .zip(&kinds)
                .map(|(&current, kind)| match kind {
                    VertexKind::Fixed => current,
                    VertexKind::Smooth(neighbors) => {
                        let sum = neighbors
                            .iter()
                            .fold(nalgebra::Vector3::zeros(), |acc, &i| acc + positions[i].coords);
                        let average = Point3::from(sum / neighbors.len() as Real);
                        let step = (average - current) * params.relaxation_factor;
                        max_step = max_step.max(step.norm());
                        current + step
                    },
                })
                .collect();
            positions = updated;

            trace!(iteration, max_step, "laplacian smoothing pass");
            if max_step <= threshold {
                break;
            }
        }

        let mut polygons = mesh.polygons.clone();
        for (poly, face) in polygons.iter_mut().zip(&conn.faces) {
            for (vertex, &index) in poly.vertices.iter_mut().zip(face) {
                vertex.pos = positions[index];
            }
            poly.recompute_plane();
        }

        Mesh::from_polygons(&polygons, mesh.metadata.clone())
    }
}
