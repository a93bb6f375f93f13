//! Closed test solids used by the `generate` command and the test-suite

use crate::float_types::{PI, Real, TAU};
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Axis-aligned box spanning `[0, width] × [0, length] × [0, height]`.
    ///
    /// ```text
    ///     4-------5
    ///    /|      /|
    ///   0-------1 |
    ///   | |     | |
    ///   | 7-----|-6
    ///   |/      |/
    ///   3-------2
    /// ```
    /// Faces are wound counter-clockwise seen from outside.
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> Mesh<S> {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(width, 0.0, 0.0),
            Point3::new(width, length, 0.0),
            Point3::new(0.0, length, 0.0),
            Point3::new(0.0, 0.0, height),
            Point3::new(width, 0.0, height),
            Point3::new(width, length, height),
            Point3::new(0.0, length, height),
        ];

        let faces: [([usize; 4], Vector3<Real>); 6] = [
            ([0, 3, 2, 1], -Vector3::z()), // bottom
            ([4, 5, 6, 7], Vector3::z()),  // top
            ([0, 1, 5, 4], -Vector3::y()), // front
            ([3, 7, 6, 2], Vector3::y()),  // back
            ([0, 4, 7, 3], -Vector3::x()), // left
            ([1, 2, 6, 5], Vector3::x()),  // right
        ];

        let polygons: Vec<Polygon<S>> = faces
            .iter()
            .map(|(indices, normal)| {
                let vertices = indices
                    .iter()
                    .map(|&i| Vertex::new(corners[i], *normal))
                    .collect();
                Polygon::new(vertices, metadata.clone())
            })
            .collect();

        Mesh::from_polygons(&polygons, metadata)
    }

    pub fn cube(width: Real, metadata: Option<S>) -> Mesh<S> {
        Self::cuboid(width, width, width, metadata)
    }

    /// UV sphere centred at the origin, poles on ±Y.
    ///
    /// `segments` around the axis (≥ 3) and `stacks` from pole to pole (≥ 2);
    /// smaller values are clamped. Caps are triangles, the rest are split quads.
    pub fn sphere(radius: Real, segments: usize, stacks: usize, metadata: Option<S>) -> Mesh<S> {
        let segments = segments.max(3);
        let stacks = stacks.max(2);

        let vertex = |pos: Point3<Real>| Vertex::new(pos, pos.coords.normalize());
        let ring_point = |j: usize, i: usize| {
            let phi = j as Real / stacks as Real * PI;
            let theta = (i % segments) as Real / segments as Real * TAU;
            Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            )
        };

        let north = Point3::new(0.0, radius, 0.0);
        let south = Point3::new(0.0, -radius, 0.0);
        let mut polygons = Vec::with_capacity(segments * stacks * 2);
        let mut push = |points: [Point3<Real>; 3]| {
            polygons.push(Polygon::new(points.map(vertex).to_vec(), metadata.clone()));
        };

        for i in 0..segments {
            push([north, ring_point(1, i + 1), ring_point(1, i)]);
        }

        for j in 1..stacks - 1 {
            for i in 0..segments {
                let v1 = ring_point(j, i);
                let v2 = ring_point(j, i + 1);
                let v3 = ring_point(j + 1, i);
                let v4 = ring_point(j + 1, i + 1);
                push([v1, v2, v3]);
                push([v2, v4, v3]);
            }
        }

        for i in 0..segments {
            push([south, ring_point(stacks - 1, i), ring_point(stacks - 1, i + 1)]);
        }

        Mesh::from_polygons(&polygons, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_point_outward() {
        let cube: Mesh<()> = Mesh::cube(2.0, None);
        assert_eq!(cube.polygons.len(), 6);
        let center = Point3::new(1.0, 1.0, 1.0);
        for poly in &cube.polygons {
            let to_face = poly.vertices[0].pos - center;
            assert!(poly.plane.normal().dot(&to_face) > 0.0);
        }
        assert!((cube.signed_volume() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_is_closed_and_outward() {
        let sphere: Mesh<()> = Mesh::sphere(1.0, 16, 8, None);
        assert_eq!(sphere.polygons.len(), 16 * 2 + 16 * 6 * 2);
        assert!(sphere.is_manifold());
        let volume = sphere.signed_volume();
        assert!(volume > 0.0);
        assert!(volume < 4.0 / 3.0 * PI);
        for poly in &sphere.polygons {
            let centroid = poly
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords)
                / 3.0;
            assert!(poly.plane.normal().dot(&centroid) > 0.0);
        }
    }
}
