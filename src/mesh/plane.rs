//! Oriented planes and polygon splitting for the BSP engine.

use crate::float_types::{EPSILON, Real};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Isometry3, Matrix4, Point3, Rotation3, Translation3, Vector3};

// Classification bit flags; SPANNING == FRONT | BACK
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane in Hessian normal form: `normal · p = w`, `normal` of unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    /// Create a new plane from a (not necessarily unit) normal and the offset
    /// along the *normalized* normal.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane {
            normal: normal.normalize(),
            w,
        }
    }

    /// Create a plane from three points.
    /// The normal direction follows the right-hand rule: (p2-p1) × (p3-p1)
    pub fn from_points(p1: Point3<Real>, p2: Point3<Real>, p3: Point3<Real>) -> Self {
        let normal = (p2 - p1).cross(&(p3 - p1));

        if normal.norm_squared() < Real::EPSILON * Real::EPSILON {
            return Plane {
                normal: Vector3::z(),
                w: 0.0,
            };
        }

        let normal = normal.normalize();
        let w = normal.dot(&p1.coords);
        Plane { normal, w }
    }

    /// Fit a plane through a polygon's vertices.
    ///
    /// Uses the longest chord plus the vertex farthest from it, which keeps
    /// slivers from producing garbage normals, then orients the result to
    /// agree with the winding (Newell normal).
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let n = vertices.len();
        if n < 3 {
            return Plane {
                normal: Vector3::z(),
                w: 0.0,
            };
        }

        let reference_plane = Self::from_points(vertices[0].pos, vertices[1].pos, vertices[2].pos);
        if n == 3 {
            return reference_plane;
        }

        let Some((i0, i1, _)) = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, (vertices[i].pos - vertices[j].pos).norm_squared()))
            .max_by(|a, b| a.2.total_cmp(&b.2))
        else {
            return reference_plane;
        };

        let p0 = vertices[i0].pos;
        let p1 = vertices[i1].pos;
        let dir = p1 - p0;
        if dir.norm_squared() < EPSILON * EPSILON {
            return reference_plane;
        }

        let Some((i2, max_area2)) = vertices
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != i0 && *idx != i1)
            .map(|(idx, v)| (idx, (v.pos - p0).cross(&dir).norm_squared()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return reference_plane;
        };

        if max_area2 <= EPSILON * EPSILON {
            // all vertices collinear
            return reference_plane;
        }

        let mut plane_hq = Self::from_points(p0, p1, vertices[i2].pos);

        let newell = vertices.iter().zip(vertices.iter().cycle().skip(1)).fold(
            Vector3::zeros(),
            |acc, (curr, next)| acc + curr.pos.coords.cross(&next.pos.coords),
        );

        if plane_hq.normal.dot(&newell) < 0.0 {
            plane_hq.flip();
        }

        plane_hq
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane (reverse normal and offset)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Classify a point relative to the plane using the robust `orient3d` predicate.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        // Three points spanning the plane, built from an orthonormal basis
        let p0 = Point3::from(self.normal * (self.w / self.normal.norm_squared()));

        let mut u = if self.normal.z.abs() > self.normal.x.abs()
            || self.normal.z.abs() > self.normal.y.abs()
        {
            Vector3::x().cross(&self.normal)
        } else {
            Vector3::z().cross(&self.normal)
        };
        u.normalize_mut();
        let v = self.normal.cross(&u).normalize();

        let a = p0;
        let b = p0 + u;
        let c = p0 + v;

        let sign = robust::orient3d(
            robust::Coord3D { x: a.x, y: a.y, z: a.z },
            robust::Coord3D { x: b.x, y: b.y, z: b.z },
            robust::Coord3D { x: c.x, y: c.y, z: c.z },
            robust::Coord3D {
                x: point.x,
                y: point.y,
                z: point.z,
            },
        );

        // orient3d is positive when the point lies below (a, b, c)
        if sign > EPSILON {
            BACK
        } else if sign < -EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Classify a polygon with respect to the plane.
    /// Returns a bitmask of COPLANAR, FRONT, and BACK.
    pub fn classify_polygon<S: Clone>(&self, polygon: &Polygon<S>) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos))
    }

    /// Splits a polygon by this plane, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon<S: Clone + Send + Sync>(
        &self,
        polygon: &Polygon<S>,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let normal = self.normal();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(&v.pos))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if normal.dot(&polygon.plane.normal()) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut split_front = Vec::<Vertex>::with_capacity(polygon.vertices.len() + 1);
                let mut split_back = Vec::<Vertex>::with_capacity(polygon.vertices.len() + 1);

                for i in 0..polygon.vertices.len() {
                    let j = (i + 1) % polygon.vertices.len();
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(*vertex_i);
                    }
                    if type_i != FRONT {
                        split_back.push(*vertex_i);
                    }

                    if (type_i | type_j) == SPANNING {
                        let denom = normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > EPSILON {
                            let t = (self.offset() - normal.dot(&vertex_i.pos.coords)) / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t);
                            split_front.push(vertex_new);
                            split_back.push(vertex_new);
                        }
                    }
                }

                // Fragments keep the parent plane; refitting would drift
                if split_front.len() >= 3 {
                    front.push(Polygon::with_plane(
                        split_front,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::with_plane(
                        split_back,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }

    /// Returns (T, T_inv), where:
    /// - `T` maps a point on this plane into XY plane (z=0) with the plane's normal going to +Z
    /// - `T_inv` is the inverse transform, mapping back
    pub fn to_xy_transform(&self) -> (Matrix4<Real>, Matrix4<Real>) {
        let n = self.normal();
        let n_len = n.norm();
        if n_len < EPSILON {
            return (Matrix4::identity(), Matrix4::identity());
        }
        let norm_dir = n / n_len;

        let rot = Rotation3::rotation_between(&norm_dir, &Vector3::z())
            .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), crate::float_types::PI));
        let iso_rot = Isometry3::from_parts(Translation3::identity(), rot.into());

        // p0 = (w / (n·n)) * n lies on the plane; move it to z = 0
        let p0_3d = n * (self.offset() / n.dot(&n));
        let p0_rot = iso_rot.transform_point(&Point3::from(p0_3d));
        let iso_trans = Translation3::new(0.0, 0.0, -p0_rot.z);

        let transform_to_xy = iso_trans.to_homogeneous() * iso_rot.to_homogeneous();
        let transform_from_xy = transform_to_xy
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);

        (transform_to_xy, transform_from_xy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(points: [[Real; 3]; 3]) -> Polygon<()> {
        Polygon::new(
            points
                .iter()
                .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
                .collect(),
            None,
        )
    }

    #[test]
    fn orient_point_sides() {
        let plane = Plane::from_normal(Vector3::z(), 1.0);
        assert_eq!(plane.orient_point(&Point3::new(0.3, -2.0, 2.0)), FRONT);
        assert_eq!(plane.orient_point(&Point3::new(5.0, 5.0, 0.0)), BACK);
        assert_eq!(plane.orient_point(&Point3::new(-4.0, 7.0, 1.0)), COPLANAR);
    }

    #[test]
    fn from_vertices_follows_winding() {
        let ccw = triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!((ccw.plane.normal - Vector3::z()).norm() < 1e-12);

        let quad = [
            Vertex::new(Point3::new(0.0, 0.0, 2.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 2.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 1.0, 2.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 2.0), Vector3::z()),
        ];
        let plane = Plane::from_vertices(&quad);
        assert!((plane.normal + Vector3::z()).norm() < 1e-12);
        assert!((plane.w + 2.0).abs() < 1e-12);
    }

    #[test]
    fn split_spanning_triangle() {
        let plane = Plane::from_normal(Vector3::x(), 0.5);
        let tri = triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(plane.classify_polygon(&tri), SPANNING);

        let (cf, cb, front, back) = plane.split_polygon(&tri);
        assert!(cf.is_empty() && cb.is_empty());
        assert_eq!(front.len(), 1);
        assert_eq!(back.len(), 1);
        assert_eq!(front[0].vertices.len(), 3);
        assert_eq!(back[0].vertices.len(), 4);
        assert!(front[0].vertices.iter().all(|v| v.pos.x >= 0.5 - 1e-12));
        assert!(back[0].vertices.iter().all(|v| v.pos.x <= 0.5 + 1e-12));
    }

    #[test]
    fn split_coplanar_by_orientation() {
        let plane = Plane::from_normal(Vector3::z(), 0.0);
        let up = triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let mut down = up.clone();
        down.flip();

        let (cf, cb, _, _) = plane.split_polygon(&up);
        assert_eq!((cf.len(), cb.len()), (1, 0));
        let (cf, cb, _, _) = plane.split_polygon(&down);
        assert_eq!((cf.len(), cb.len()), (0, 1));
    }

    #[test]
    fn xy_transform_flattens_plane() {
        let plane = Plane::from_normal(Vector3::new(1.0, 1.0, 0.0), 3.0);
        let (to_xy, from_xy) = plane.to_xy_transform();
        let on_plane = Point3::from(plane.normal * 3.0);
        let flat = to_xy.transform_point(&on_plane);
        assert!(flat.z.abs() < 1e-9);
        let back = from_xy.transform_point(&flat);
        assert!((back - on_plane).norm() < 1e-9);
    }
}
