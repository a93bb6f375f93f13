//! `Mesh` struct and implementations of the `CSG` trait for `Mesh`

use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::traits::CSG;
use nalgebra::{Matrix4, Point3};
use std::{fmt::Debug, sync::OnceLock};

pub mod algorithm;
pub mod bsp;
pub mod connectivity;
pub mod manifold;
pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod triangulated;
pub mod vertex;

use bsp::Node;
use plane::Plane;
use polygon::Polygon;
use vertex::Vertex;

/// A polygon soup describing the boundary of a solid.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        Mesh {
            polygons: polygons.to_vec(),
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Split polygons into (may_touch, cannot_touch) using bounding‑box tests
    fn partition_polys(
        polys: &[Polygon<S>],
        other_bb: &Aabb,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut maybe = Vec::new();
        let mut never = Vec::new();
        for p in polys {
            if p.bounding_box().intersects(other_bb) {
                maybe.push(p.clone());
            } else {
                never.push(p.clone());
            }
        }
        (maybe, never)
    }

    /// A new mesh carrying this mesh's metadata
    fn with_polygons(&self, polygons: Vec<Polygon<S>>) -> Mesh<S> {
        Mesh {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Helper to collect all vertices from the Mesh.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Recompute every polygon's plane and give its vertices the face normal.
    pub fn renormalize(&mut self) {
        for poly in &mut self.polygons {
            poly.set_new_normal();
        }
        self.bounding_box = OnceLock::new();
    }

    /// Number of triangles this mesh turns into once triangulated.
    pub fn triangle_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.vertices.len().saturating_sub(2))
            .sum()
    }

    /// Triangulate each polygon in the Mesh returning a Mesh containing triangles
    pub fn triangulate(&self) -> Mesh<S> {
        let triangles = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate().into_iter().map(move |triangle| {
                    Polygon::with_plane(triangle.to_vec(), poly.plane.clone(), poly.metadata.clone())
                })
            })
            .collect::<Vec<_>>();

        Mesh::from_polygons(&triangles, self.metadata.clone())
    }

    /// Signed enclosed volume (positive for outward-facing closed surfaces).
    pub fn signed_volume(&self) -> Real {
        self.polygons
            .iter()
            .flat_map(|p| p.triangulate())
            .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)) / 6.0)
            .sum()
    }
}

/// Flip every polygon of a list, returning it
fn flipped<S: Clone + Send + Sync>(mut polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>> {
    for p in &mut polygons {
        p.flip();
    }
    polygons
}

impl<S: Clone + Send + Sync + Debug> CSG for Mesh<S> {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Return a new Mesh representing union of the two Meshes.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Mesh<S>) -> Mesh<S> {
        if self.polygons.is_empty() || other.polygons.is_empty() {
            let mut polygons = self.polygons.clone();
            polygons.extend_from_slice(&other.polygons);
            return self.with_polygons(polygons);
        }

        // avoid splitting obvious non‑intersecting faces
        let (a_clip, a_passthru) = Self::partition_polys(&self.polygons, &other.bounding_box());
        let (b_clip, b_passthru) = Self::partition_polys(&other.polygons, &self.bounding_box());

        // classification always runs against the complete solids
        let a = Node::from_polygons(&self.polygons);
        let b = Node::from_polygons(&other.polygons);

        let mut final_polys = b.clip_polygons(&a_clip);
        let b_outside = a.clip_polygons(&b_clip);
        // drop faces of b coplanar with (and facing like) faces of a
        final_polys.extend(flipped(a.clip_polygons(&flipped(b_outside))));

        final_polys.extend(a_passthru);
        final_polys.extend(b_passthru);

        self.with_polygons(final_polys)
    }

    /// Return a new Mesh representing difference of the two Meshes.
    ///
    /// ```text
    /// let c = a.difference(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn difference(&self, other: &Mesh<S>) -> Mesh<S> {
        if self.polygons.is_empty() || other.polygons.is_empty() {
            return self.with_polygons(self.polygons.clone());
        }

        let (a_clip, a_passthru) = Self::partition_polys(&self.polygons, &other.bounding_box());
        let (b_clip, _b_passthru) =
            Self::partition_polys(&other.polygons, &self.bounding_box());

        let mut a_inverted = Node::from_polygons(&self.polygons);
        a_inverted.invert();
        let b = Node::from_polygons(&other.polygons);

        // parts of a outside b
        let mut final_polys = flipped(b.clip_polygons(&flipped(a_clip)));
        // parts of b inside a, turned inside out
        let b_inside = a_inverted.clip_polygons(&b_clip);
        final_polys.extend(a_inverted.clip_polygons(&flipped(b_inside)));

        final_polys.extend(a_passthru);

        self.with_polygons(final_polys)
    }

    /// Return a new Mesh representing intersection of the two Meshes.
    ///
    /// ```text
    /// let c = a.intersection(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersection(&self, other: &Mesh<S>) -> Mesh<S> {
        if self.polygons.is_empty() || other.polygons.is_empty() {
            return self.with_polygons(Vec::new());
        }

        let mut a_inverted = Node::from_polygons(&self.polygons);
        a_inverted.invert();
        let mut b_inverted = Node::from_polygons(&other.polygons);
        b_inverted.invert();

        // parts of b inside a
        let b_inside = a_inverted.clip_polygons(&other.polygons);
        // parts of a inside b
        let mut final_polys = flipped(b_inverted.clip_polygons(&flipped(self.polygons.clone())));
        final_polys.extend(flipped(a_inverted.clip_polygons(&flipped(b_inside))));

        self.with_polygons(final_polys)
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    /// Normals use the inverse transpose; a singular matrix leaves them as they are.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh<S> {
        let mat_inv_transpose = mat.try_inverse().map(|inv| inv.transpose());
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                vert.pos = mat.transform_point(&vert.pos);
                if let Some(m) = &mat_inv_transpose {
                    let n = m.transform_vector(&vert.normal);
                    if n.norm() > Real::EPSILON {
                        vert.normal = n.normalize();
                    }
                }
            }

            // keep the cached plane consistent with the new vertex positions
            poly.plane = Plane::from_vertices(&poly.vertices);
            poly.bounding_box = OnceLock::new();
        }

        mesh.bounding_box = OnceLock::new();
        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for poly in &self.polygons {
                for v in &poly.vertices {
                    mins = mins.inf(&v.pos);
                    maxs = maxs.sup(&v.pos);
                }
            }

            // No polygons: a trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }
}
