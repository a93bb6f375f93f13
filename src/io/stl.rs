//! STL reading and writing through `stl_io`

use super::{IoError, IoResult};
use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::triangulated::Triangulated3D;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Encoding used when writing STL files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StlFormat {
    #[default]
    Ascii,
    Binary,
}

fn map_read_error(e: std::io::Error) -> IoError {
    match e.kind() {
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof | ErrorKind::InvalidInput => {
            IoError::invalid_content(e.to_string())
        },
        _ => IoError::Io(e),
    }
}

fn mesh_from_reader<R: Read + Seek, S: Clone + Debug + Send + Sync>(
    reader: &mut R,
    metadata: Option<S>,
) -> IoResult<Mesh<S>> {
    let indexed = stl_io::read_stl(reader).map_err(map_read_error)?;

    if let Some(i) = indexed
        .vertices
        .iter()
        .position(|v| !(v[0].is_finite() && v[1].is_finite() && v[2].is_finite()))
    {
        return Err(IoError::invalid_content(format!(
            "vertex {i} has a non-finite coordinate"
        )));
    }

    let points: Vec<Point3<Real>> = indexed
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
        .collect();

    let mut polygons = Vec::with_capacity(indexed.faces.len());
    for face in &indexed.faces {
        let mut corners = Vec::with_capacity(3);
        for &i in &face.vertices {
            let pos = points
                .get(i)
                .copied()
                .ok_or_else(|| IoError::invalid_content(format!("vertex index {i} out of range")))?;
            corners.push(Vertex::new(pos, Vector3::zeros()));
        }
        polygons.push(Polygon::new(corners, metadata.clone()));
    }

    // stored facet normals are ignored; the winding decides
    let mut mesh = Mesh::from_polygons(&polygons, metadata);
    mesh.renormalize();
    Ok(mesh)
}

/// Read an ASCII or binary STL file.
pub fn read_stl(path: impl AsRef<Path>) -> IoResult<Mesh<()>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    let mesh = mesh_from_reader(&mut BufReader::new(file), None)?;
    debug!(path = %path.display(), triangles = mesh.polygons.len(), "read STL");
    Ok(mesh)
}

/// Export to ASCII STL
/// Convert a shape to an **ASCII STL** string with the given `name`.
pub fn to_stl_ascii<T: Triangulated3D>(shape: &T, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("solid {name}\n"));

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        out.push_str(&format!("  facet normal {:e} {:e} {:e}\n", n.x, n.y, n.z));
        out.push_str("    outer loop\n");
        for v in &tri {
            let p = v.pos;
            out.push_str(&format!("      vertex {:e} {:e} {:e}\n", p.x, p.y, p.z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    });

    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Export to BINARY STL (returns `Vec<u8>`)
///
/// The 80-byte header is left blank, so `_name` is not stored.
pub fn to_stl_binary<T: Triangulated3D>(shape: &T, _name: &str) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex};

    let mut triangles = Vec::<Triangle>::new();
    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        triangles.push(Triangle {
            normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
            vertices: tri.map(|v| Vertex::new([v.pos.x as f32, v.pos.y as f32, v.pos.z as f32])),
        });
    });

    let mut bytes = Vec::new();
    stl_io::write_stl(&mut bytes, triangles.iter())?;
    Ok(bytes)
}

/// Write `mesh` to `path`; the solid is named after the file stem.
pub fn write_stl<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    path: impl AsRef<Path>,
    format: StlFormat,
) -> IoResult<()> {
    let path = path.as_ref();
    if mesh.is_empty() {
        return Err(IoError::EmptyMesh);
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());

    let bytes = match format {
        StlFormat::Ascii => mesh.to_stl_ascii(&name).into_bytes(),
        StlFormat::Binary => mesh.to_stl_binary(&name)?,
    };
    std::fs::write(path, bytes)?;

    debug!(path = %path.display(), ?format, triangles = mesh.triangle_count(), "wrote STL");
    Ok(())
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Parse STL data (ASCII or binary) held in memory.
    pub fn from_stl(data: &[u8], metadata: Option<S>) -> IoResult<Mesh<S>> {
        mesh_from_reader(&mut Cursor::new(data), metadata)
    }

    pub fn to_stl_ascii(&self, name: &str) -> String {
        self::to_stl_ascii(self, name)
    }

    pub fn to_stl_binary(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self::to_stl_binary(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_layout() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let text = cube.to_stl_ascii("box");
        assert!(text.starts_with("solid box\n"));
        assert!(text.ends_with("endsolid box\n"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert!(text.contains(" -1e0\n"));
        assert!(text.contains("vertex 1e0 1e0 1e0\n"));
    }

    #[test]
    fn ascii_keeps_tiny_coordinates() {
        let width = 4e-7;
        let cube: Mesh<()> = Mesh::cube(width, None);
        let text = cube.to_stl_ascii("speck");
        let back: Mesh<()> = Mesh::from_stl(text.as_bytes(), None).expect("valid STL");
        assert_eq!(back.polygons.len(), 12);

        let max_x = back
            .vertices()
            .iter()
            .map(|v| v.pos.x)
            .fold(Real::MIN, Real::max);
        assert!((max_x - width).abs() < 1e-6 * width);
        let expected = width * width * width;
        assert!((back.signed_volume() - expected).abs() < 1e-5 * expected);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let mut bytes = cube.to_stl_binary("box").expect("binary export");
        // x of the first vertex of the first facet
        bytes[96..100].copy_from_slice(&f32::NAN.to_le_bytes());

        match Mesh::<()>::from_stl(&bytes, None) {
            Err(IoError::InvalidContent { message }) => {
                assert!(message.contains("non-finite"), "{message}")
            },
            other => panic!("expected invalid content, got {other:?}"),
        }

        let mut bytes = cube.to_stl_binary("box").expect("binary export");
        bytes[100..104].copy_from_slice(&f32::INFINITY.to_le_bytes());
        assert!(matches!(
            Mesh::<()>::from_stl(&bytes, None),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn binary_size_matches_triangle_count() {
        let cube: Mesh<()> = Mesh::cube(1.0, None);
        let bytes = cube.to_stl_binary("box").expect("binary export");
        assert_eq!(bytes.len(), 84 + 12 * 50);
    }

    #[test]
    fn parse_ascii_facet() {
        let text = "solid t\n\
            facet normal 0 0 1\n\
            outer loop\n\
            vertex 0 0 0\n\
            vertex 1 0 0\n\
            vertex 0 1 0\n\
            endloop\n\
            endfacet\n\
            endsolid t\n";
        let mesh: Mesh<()> = Mesh::from_stl(text.as_bytes(), None).expect("valid STL");
        assert_eq!(mesh.polygons.len(), 1);
        assert!((mesh.polygons[0].plane.normal() - Vector3::z()).norm() < 1e-12);
        assert!(mesh.polygons[0].vertices.iter().all(|v| v.normal == Vector3::z()));
    }

    #[test]
    fn garbage_is_invalid_content() {
        let result: IoResult<Mesh<()>> = Mesh::from_stl(b"definitely not an stl", None);
        assert!(matches!(result, Err(IoError::InvalidContent { .. }) | Err(IoError::Io(_))));
    }
}
