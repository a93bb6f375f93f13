//! Welded vertex indices and face/edge adjacency for polygon soups

use crate::float_types::Real;
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::fmt::Debug;

/// Maps positions to shared vertex indices.
///
/// Positions are quantised to a grid of cell size `epsilon`; with
/// `epsilon == 0` only bitwise-equal coordinates are merged.
#[derive(Debug, Clone)]
pub struct VertexIndexMap {
    pub position_to_index: HashMap<(i64, i64, i64), usize>,
    pub positions: Vec<Point3<Real>>,
    pub epsilon: Real,
}

impl VertexIndexMap {
    pub fn new(epsilon: Real) -> Self {
        Self {
            position_to_index: HashMap::new(),
            positions: Vec::new(),
            epsilon: epsilon.max(0.0),
        }
    }

    fn key(&self, p: &Point3<Real>) -> (i64, i64, i64) {
        if self.epsilon > 0.0 {
            let q = |c: Real| (c / self.epsilon).round() as i64;
            (q(p.x), q(p.y), q(p.z))
        } else {
            // + 0.0 folds -0.0 into 0.0
            let q = |c: Real| (c + 0.0).to_bits() as i64;
            (q(p.x), q(p.y), q(p.z))
        }
    }

    /// Index of the welded vertex for `p`, creating one if needed.
    /// The first position seen for a cell is the representative.
    pub fn get_or_create_index(&mut self, p: Point3<Real>) -> usize {
        let key = self.key(&p);
        if let Some(&idx) = self.position_to_index.get(&key) {
            return idx;
        }
        let idx = self.positions.len();
        self.positions.push(p);
        self.position_to_index.insert(key, idx);
        idx
    }

    pub fn position(&self, index: usize) -> Point3<Real> {
        self.positions[index]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Index view of a mesh: `faces[i]` belongs to `mesh.polygons[i]`.
#[derive(Debug, Clone)]
pub struct Connectivity {
    pub vertex_map: VertexIndexMap,
    pub faces: Vec<Vec<usize>>,
    /// Sorted, de-duplicated neighbours of every vertex
    pub adjacency: HashMap<usize, Vec<usize>>,
}

impl Connectivity {
    /// Undirected edge key
    pub const fn edge_key(a: usize, b: usize) -> (usize, usize) {
        if a < b { (a, b) } else { (b, a) }
    }

    /// Directed edges of face `face`, skipping collapsed ones.
    pub fn face_edges(&self, face: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let f = &self.faces[face];
        f.iter()
            .zip(f.iter().cycle().skip(1))
            .map(|(&a, &b)| (a, b))
            .filter(|(a, b)| a != b)
    }

    /// Faces incident to each undirected edge, in face order.
    pub fn edge_faces(&self) -> HashMap<(usize, usize), Vec<usize>> {
        let mut map: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for face in 0..self.faces.len() {
            for (a, b) in self.face_edges(face) {
                let entry = map.entry(Self::edge_key(a, b)).or_default();
                if entry.last() != Some(&face) {
                    entry.push(face);
                }
            }
        }
        map
    }

    /// Edges used by exactly one face, sorted.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<_> = self
            .edge_faces()
            .into_iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Faces sharing each vertex.
    pub fn vertex_faces(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.vertex_map.len()];
        for (face, indices) in self.faces.iter().enumerate() {
            for &v in indices {
                if out[v].last() != Some(&face) {
                    out[v].push(face);
                }
            }
        }
        out
    }
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Weld vertices closer than `epsilon` and build face/vertex adjacency.
    pub fn build_connectivity(&self, epsilon: Real) -> Connectivity {
        let mut vertex_map = VertexIndexMap::new(epsilon);
        let faces: Vec<Vec<usize>> = self
            .polygons
            .iter()
            .map(|poly| {
                poly.vertices
                    .iter()
                    .map(|v| vertex_map.get_or_create_index(v.pos))
                    .collect()
            })
            .collect();

        let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
        for face in &faces {
            let n = face.len();
            for i in 0..n {
                let (a, b) = (face[i], face[(i + 1) % n]);
                if a == b {
                    continue;
                }
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Connectivity {
            vertex_map,
            faces,
            adjacency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::polygon::Polygon;
    use crate::mesh::vertex::Vertex;
    use nalgebra::Vector3;

    #[test]
    fn cube_welds_to_eight_vertices() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let conn = cube.build_connectivity(0.0);
        assert_eq!(conn.vertex_map.len(), 8);
        assert_eq!(conn.edge_faces().len(), 12);
        assert!(conn.boundary_edges().is_empty());
        assert!(conn.adjacency.values().all(|n| n.len() == 3));
    }

    #[test]
    fn near_points_merge_only_with_tolerance() {
        let mut exact = VertexIndexMap::new(0.0);
        let a = exact.get_or_create_index(Point3::new(0.0, 0.0, 0.0));
        let b = exact.get_or_create_index(Point3::new(1e-9, 0.0, 0.0));
        let c = exact.get_or_create_index(Point3::new(-0.0, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(a, c);

        let mut welded = VertexIndexMap::new(1e-6);
        let a = welded.get_or_create_index(Point3::new(0.0, 0.0, 0.0));
        let b = welded.get_or_create_index(Point3::new(1e-9, 0.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(welded.position(a), Point3::origin());
    }

    #[test]
    fn single_triangle_is_all_boundary() {
        let tri = Polygon::new(
            vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::z()),
                Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
                Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z()),
            ],
            None,
        );
        let mesh: Mesh<()> = Mesh::from_polygons(&[tri], None);
        let conn = mesh.build_connectivity(0.0);
        assert_eq!(conn.boundary_edges(), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(conn.vertex_faces(), vec![vec![0], vec![0], vec![0]]);
    }
}
