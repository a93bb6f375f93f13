//! Normal estimation: consistent winding, optional outward orientation,
//! and per-corner normals averaged over neighbouring faces.

use crate::float_types::{Real, tolerance};
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt::Debug;
use tracing::debug;

/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalsParams {
    pub compute_point_normals: bool,
    pub compute_cell_normals: bool,
    pub flip_normals: bool,
    /// Only faces within `feature_angle` of a corner's own face shape its normal
    pub splitting: bool,
    pub feature_angle: Real,
    /// Make neighbouring faces agree on winding
    pub consistency: bool,
    /// Orient every closed component outward
    pub auto_orient: bool,
}

impl Default for NormalsParams {
    fn default() -> Self {
        Self {
            compute_point_normals: true,
            compute_cell_normals: false,
            flip_normals: false,
            splitting: false,
            feature_angle: 30.0,
            consistency: true,
            auto_orient: false,
        }
    }
}

fn reverse<S: Clone + Send + Sync>(poly: &mut Polygon<S>, face: &mut [usize]) {
    poly.flip();
    face.reverse();
}

/// `true` if `face` walks the directed edge `a → b`.
fn has_directed_edge(face: &[usize], a: usize, b: usize) -> bool {
    let n = face.len();
    (0..n).any(|i| face[i] == a && face[(i + 1) % n] == b)
}

/// Signed volume of a subset of polygons, relative to the origin.
fn component_volume<S: Clone + Send + Sync>(polygons: &[Polygon<S>], faces: &[usize]) -> Real {
    faces
        .iter()
        .flat_map(|&f| polygons[f].triangulate())
        .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)) / 6.0)
        .sum()
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Recompute winding and normals following `params`.
    pub fn compute_normals(&self, params: &NormalsParams) -> Mesh<S> {
        let conn = self.build_connectivity(tolerance());
        let mut polygons = self.polygons.clone();
        let mut faces = conn.faces.clone();

        if params.consistency || params.auto_orient {
            let edge_faces = conn.edge_faces();
            let mut visited = vec![false; faces.len()];
            let mut components: Vec<Vec<usize>> = Vec::new();
            let mut reversed = 0usize;

            for seed in 0..faces.len() {
                if visited[seed] {
                    continue;
                }
                visited[seed] = true;
                let mut component = vec![seed];
                let mut queue = VecDeque::from([seed]);

                while let Some(face) = queue.pop_front() {
                    let n = faces[face].len();
                    for i in 0..n {
                        let (a, b) = (faces[face][i], faces[face][(i + 1) % n]);
                        if a == b {
                            continue;
                        }
                        let key = if a < b { (a, b) } else { (b, a) };
                        let Some(neighbors) = edge_faces.get(&key) else {
                            continue;
                        };
                        for &other in neighbors {
                            if visited[other] {
                                continue;
                            }
                            visited[other] = true;
                            if params.consistency && has_directed_edge(&faces[other], a, b) {
                                reverse(&mut polygons[other], &mut faces[other]);
                                reversed += 1;
                            }
                            component.push(other);
                            queue.push_back(other);
                        }
                    }
                }
                components.push(component);
            }
            debug!(components = components.len(), reversed, "winding made consistent");

            if params.auto_orient {
                for component in &components {
                    if component_volume(&polygons, component) < 0.0 {
                        for &f in component {
                            reverse(&mut polygons[f], &mut faces[f]);
                        }
                    }
                }
            }
        }

        if params.flip_normals {
            for (poly, face) in polygons.iter_mut().zip(faces.iter_mut()) {
                reverse(poly, face);
            }
        }

        let face_normals: Vec<Vector3<Real>> = polygons.iter().map(|p| p.plane.normal()).collect();

        if params.compute_point_normals {
            let vertex_faces = {
                let mut out = vec![Vec::new(); conn.vertex_map.len()];
                for (f, face) in faces.iter().enumerate() {
                    for &v in face {
                        if out[v].last() != Some(&f) {
                            out[v].push(f);
                        }
                    }
                }
                out
            };
            let cos_feature = params.feature_angle.to_radians().cos();

            for (f, (poly, face)) in polygons.iter_mut().zip(&faces).enumerate() {
                let own = face_normals[f];
                for (vertex, &v) in poly.vertices.iter_mut().zip(face) {
                    let sum = vertex_faces[v]
                        .iter()
                        .map(|&g| face_normals[g])
                        .filter(|n| !params.splitting || n.dot(&own) >= cos_feature)
                        .fold(Vector3::zeros(), |acc, n| acc + n);
                    vertex.normal = sum.try_normalize(Real::EPSILON).unwrap_or(own);
                }
            }
        } else if params.compute_cell_normals {
            for (poly, normal) in polygons.iter_mut().zip(&face_normals) {
                for vertex in &mut poly.vertices {
                    vertex.normal = *normal;
                }
            }
        }

        Mesh::from_polygons(&polygons, self.metadata.clone())
    }
}
