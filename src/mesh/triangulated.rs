use crate::mesh::Mesh;
use crate::mesh::vertex::Vertex;
use crate::triangulated::Triangulated3D;

impl<S: Clone + Send + Sync + std::fmt::Debug> Triangulated3D for Mesh<S> {
    /// Visits every triangle; each corner carries the polygon's plane normal.
    fn visit_triangles<F>(&self, mut f: F)
    where
        F: FnMut([Vertex; 3]),
    {
        for poly in &self.polygons {
            let normal = poly.plane.normal();
            for tri in poly.triangulate() {
                f(tri.map(|v| Vertex { pos: v.pos, normal }));
            }
        }
    }
}
