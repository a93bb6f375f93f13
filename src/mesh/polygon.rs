//! Struct and functions for working with planar `Polygon`s

use crate::float_types::{EPSILON, Real, parry3d::bounding_volume::Aabb};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// A convex or concave planar polygon, carrying its own plane and optional metadata.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    /// Vertices in counter-clockwise order when viewed from the front of `plane`
    pub vertices: Vec<Vertex>,

    /// The plane on which this polygon lies
    pub plane: Plane,

    /// Lazily calculated bounding box
    pub bounding_box: OnceLock<Aabb>,

    /// Generic metadata
    pub metadata: Option<S>,
}

impl<S: Clone + PartialEq> PartialEq for Polygon<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
    }
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices, fitting its plane.
    ///
    /// # Panics
    /// If fewer than three vertices are given.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        let plane = Plane::from_vertices(&vertices);
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Create a polygon that lies on an already known plane.
    pub fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Axis aligned bounding box of this polygon (cached)
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Reverse winding order, flip vertex normals and the plane
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Recompute the plane from the current vertex positions and assign its
    /// normal to every vertex.
    pub fn set_new_normal(&mut self) {
        self.recompute_plane();
        let normal = self.plane.normal();
        for v in &mut self.vertices {
            v.normal = normal;
        }
    }

    /// Recompute the plane (and drop the cached bounding box) after vertices moved.
    /// Vertex normals are left untouched.
    pub fn recompute_plane(&mut self) {
        self.plane = Plane::from_vertices(&self.vertices);
        self.bounding_box = OnceLock::new();
    }

    /// Iterate over the polygon's edges, the closing edge last.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices.iter().zip(self.vertices.iter().cycle().skip(1))
    }

    /// Area vector (Newell) of the polygon; its length is twice the area.
    pub fn area_vector(&self) -> Vector3<Real> {
        let origin = self.vertices[0].pos;
        self.edges().fold(Vector3::zeros(), |acc, (a, b)| {
            acc + (a.pos - origin).cross(&(b.pos - origin))
        })
    }

    pub fn area(&self) -> Real {
        self.area_vector().norm() * 0.5
    }

    /// `true` if the polygon has (numerically) no area.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3 || self.area() <= EPSILON * EPSILON
    }

    fn is_convex(&self) -> bool {
        let normal = self.plane.normal();
        let n = self.vertices.len();
        (0..n).all(|i| {
            let a = self.vertices[i].pos;
            let b = self.vertices[(i + 1) % n].pos;
            let c = self.vertices[(i + 2) % n].pos;
            (b - a).cross(&(c - b)).dot(&normal) >= -EPSILON
        })
    }

    /// Triangulate this polygon into a list of triangles, each triangle is [v0, v1, v2].
    ///
    /// Convex polygons are fanned from the first vertex; anything else is
    /// ear-cut in the polygon's own plane.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        let n = self.vertices.len();
        if n < 3 {
            return Vec::new();
        }
        if n == 3 {
            return vec![[self.vertices[0], self.vertices[1], self.vertices[2]]];
        }

        if self.is_convex() {
            return (1..n - 1)
                .map(|i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
                .collect();
        }

        let (to_xy, _) = self.plane.to_xy_transform();
        let outer: Vec<Coord<Real>> = self
            .vertices
            .iter()
            .map(|v| {
                let p = to_xy.transform_point(&v.pos);
                Coord { x: p.x, y: p.y }
            })
            .collect();

        let triangulation =
            GeoPolygon::new(LineString::new(outer), Vec::new()).earcut_triangles_raw();

        // Indices refer to ring coordinates; the closing coordinate is vertex 0 again
        triangulation
            .triangle_indices
            .chunks_exact(3)
            .map(|tri| {
                [
                    self.vertices[tri[0] % n],
                    self.vertices[tri[1] % n],
                    self.vertices[tri[2] % n],
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(points: &[[Real; 2]]) -> Polygon<()> {
        Polygon::new(
            points
                .iter()
                .map(|p| Vertex::new(Point3::new(p[0], p[1], 0.0), Vector3::z()))
                .collect(),
            None,
        )
    }

    #[test]
    fn square_area_and_fan() {
        let square = poly(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);
        assert!((square.area() - 4.0).abs() < 1e-12);
        let tris = square.triangulate();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn edges_close_the_loop() {
        let tri = poly(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let edges: Vec<_> = tri.edges().map(|(a, b)| (a.pos.x, b.pos.x)).collect();
        assert_eq!(edges, vec![(0.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert!((tri.area_vector() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn concave_polygon_is_ear_cut() {
        // an "L" shape, area 3
        let l_shape = poly(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ]);
        let tris = l_shape.triangulate();
        assert_eq!(tris.len(), 4);
        let total: Real = tris
            .iter()
            .map(|t| (t[1].pos - t[0].pos).cross(&(t[2].pos - t[0].pos)).norm() * 0.5)
            .sum();
        assert!((total - 3.0).abs() < 1e-9);
    }

    #[test]
    fn flip_reverses_everything() {
        let mut tri = poly(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let first = tri.vertices[0].pos;
        tri.flip();
        assert_eq!(tri.vertices[2].pos, first);
        assert!((tri.plane.normal + Vector3::z()).norm() < 1e-12);
        assert!(tri.vertices.iter().all(|v| v.normal == -Vector3::z()));
    }

    #[test]
    fn collinear_polygon_is_degenerate() {
        let sliver = poly(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        assert!(sliver.is_degenerate());
    }
}
