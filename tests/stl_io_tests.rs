mod support;

use approx::assert_relative_eq;
use stlbool::{IoError, Mesh, StlFormat, io, traits::CSG};

use crate::support::write_mesh;

#[test]
fn ascii_file_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cube: Mesh<()> = Mesh::cube(2.0, None);
    let path = write_mesh(dir.path(), "cube.stl", &cube, StlFormat::Ascii);

    let text = std::fs::read_to_string(&path).expect("written file");
    assert!(text.starts_with("solid cube\n"));

    let back = io::read_stl(&path).expect("readable STL");
    assert_eq!(back.polygons.len(), 12);
    assert!(back.is_manifold());
    assert_relative_eq!(back.signed_volume(), 8.0, epsilon = 1e-9);
}

#[test]
fn binary_file_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sphere: Mesh<()> = Mesh::sphere(1.0, 16, 8, None).translate(2.0, 0.0, 0.0);
    let path = write_mesh(dir.path(), "sphere.stl", &sphere, StlFormat::Binary);

    let back = io::read_stl(&path).expect("readable STL");
    assert_eq!(back.polygons.len(), sphere.triangle_count());
    assert!(back.is_manifold());
    // coordinates go through f32
    assert_relative_eq!(back.signed_volume(), sphere.signed_volume(), epsilon = 1e-4);
}

#[test]
fn in_memory_binary_round_trip() {
    let cube: Mesh<()> = Mesh::cube(1.0, None);
    let bytes = cube.to_stl_binary("cube").expect("binary export");
    let back: Mesh<()> = Mesh::from_stl(&bytes, None).expect("valid STL");
    assert_eq!(back.polygons.len(), 12);
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nope.stl");
    match io::read_stl(&path) {
        Err(IoError::FileNotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn empty_mesh_is_not_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("empty.stl");
    let result = io::write_stl(&Mesh::<()>::new(), &path, StlFormat::Ascii);
    assert!(matches!(result, Err(IoError::EmptyMesh)));
    assert!(!path.exists());
}

#[test]
fn polygons_are_triangulated_on_write() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cube: Mesh<()> = Mesh::cube(1.0, None);
    assert_eq!(cube.polygons.len(), 6);
    let path = write_mesh(dir.path(), "quads.stl", &cube, StlFormat::Ascii);
    let text = std::fs::read_to_string(path).expect("written file");
    assert_eq!(text.matches("endfacet").count(), 12);
}
