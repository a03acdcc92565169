use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use log::{debug, info, warn};

use super::{obj, Vertex};
use crate::error::{LoadError, ParseError};

/// A triangle mesh after index alignment.
///
/// `coords` holds every distinct position once, `indices` holds one entry per
/// face corner pointing into `coords`, and `mesh_coords` is the same data
/// unpacked so that every three consecutive positions form a triangle (what a
/// non-indexed draw consumes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    coords: Vec<Vec3>,
    indices: Vec<u32>,
    mesh_coords: Vec<Vec3>,
}

impl Mesh {
    /// Parse OBJ text given as individual lines.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let data = obj::parse_lines(lines)?;
        Self::from_indexed(&data.positions, &data.indices)
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::from_lines(text.lines())
    }

    pub fn from_obj(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading model: {}", path.display());

        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let mut reader = BufReader::new(file);

        // Decode per line so a stray non-UTF-8 byte only affects its own
        // line. In a comment it is skipped, in a record it fails the parse.
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            lines.push(line.trim_end_matches(['\r', '\n']).to_string());
        }

        let mesh = Self::from_lines(lines)?;
        debug!(
            "{}: {} unique vertices, {} triangles",
            path.display(),
            mesh.coords.len(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }

    /// Like [`Mesh::from_obj`], but a file that cannot be read yields an
    /// empty mesh. Parse errors still fail the load.
    pub fn from_obj_or_empty(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        match Self::from_obj(path) {
            Ok(mesh) => Ok(mesh),
            Err(LoadError::Io { path, source }) => {
                warn!("Could not read {}: {}, using empty mesh", path.display(), source);
                Ok(Self::default())
            }
            Err(LoadError::Parse(e)) => Err(e),
        }
    }

    /// Align a raw position pool and 0-based corner indices into a mesh.
    pub fn from_indexed(positions: &[Vec3], indices: &[usize]) -> Result<Self, ParseError> {
        let (coords, indices) = align(positions, indices)?;
        let mesh_coords = unpack(&coords, &indices);
        Ok(Self {
            coords,
            indices,
            mesh_coords,
        })
    }

    /// Run alignment again on already aligned data. Always returns an
    /// identical mesh.
    pub fn realign(&self) -> Self {
        let indices: Vec<usize> = self.indices.iter().map(|&i| i as usize).collect();
        // indices were produced by `align`, so they are always in range
        Self::from_indexed(&self.coords, &indices).unwrap_or_else(|_| self.clone())
    }

    /// Positions laid out three per triangle, for non-indexed drawing.
    pub fn mesh_coords(&self) -> &[Vec3] {
        &self.mesh_coords
    }

    /// Unique positions, for indexed drawing together with
    /// [`Mesh::triangle_indices`].
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    pub fn triangle_indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn num_triangles(&self) -> usize {
        self.mesh_coords.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.mesh_coords.is_empty()
    }

    /// The flat buffer as uploadable vertices, colored by position.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.mesh_coords
            .iter()
            .copied()
            .map(Vertex::from_position)
            .collect()
    }
}

/// Exact-value key for a position. `-0.0` and `0.0` compare equal as floats,
/// so they share a key.
fn exact_key(v: Vec3) -> [u32; 3] {
    v.to_array()
        .map(|c| if c == 0.0 { 0.0f32.to_bits() } else { c.to_bits() })
}

/// Deduplicate the positions referenced by `indices` and remap the indices
/// into a compact `0..k` range, numbering positions by first reference.
pub fn align(positions: &[Vec3], indices: &[usize]) -> Result<(Vec<Vec3>, Vec<u32>), ParseError> {
    let mut verts = Vec::with_capacity(positions.len());
    let mut aligned = Vec::with_capacity(indices.len());
    let mut seen: HashMap<[u32; 3], u32> = HashMap::with_capacity(positions.len());

    for (corner, &index) in indices.iter().enumerate() {
        let v = *positions.get(index).ok_or(ParseError::IndexOutOfRange {
            corner,
            index: index + 1,
            len: positions.len(),
        })?;

        let next = verts.len() as u32;
        let slot = *seen.entry(exact_key(v)).or_insert_with(|| {
            verts.push(v);
            next
        });
        aligned.push(slot);
    }

    Ok((verts, aligned))
}

/// Resolve every index back into its position.
pub fn unpack(coords: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    indices.iter().map(|&i| coords[i as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [&str; 4] = ["v 0 0 0", "v 1 0 0", "v 0 1 0", "f 1 2 3"];

    const QUAD: [&str; 6] = [
        "v 0 0 0",
        "v 1 0 0",
        "v 1 1 0",
        "v 0 1 0",
        "f 1 2 3",
        "f 1 3 4",
    ];

    #[test]
    fn single_triangle() {
        let mesh = Mesh::from_lines(TRIANGLE).unwrap();
        assert_eq!(mesh.coords().len(), 3);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2]);
        assert_eq!(mesh.mesh_coords(), &[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn shared_edge_is_deduplicated() {
        let mesh = Mesh::from_lines(QUAD).unwrap();
        assert_eq!(mesh.coords().len(), 4);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.num_triangles(), 2);

        // exactly one pair of indices (the shared edge) appears in both triangles
        let (a, b) = mesh.triangle_indices().split_at(3);
        let shared: Vec<_> = a.iter().filter(|i| b.contains(i)).collect();
        assert_eq!(shared, vec![&0, &2]);
    }

    #[test]
    fn duplicate_positions_in_pool_collapse() {
        // vertex 4 repeats vertex 1 verbatim
        let mesh = Mesh::from_lines([
            "v 0 0 0", "v 1 0 0", "v 0 1 0", "v 0 0 0", "v 0 0 1", "f 1 2 3", "f 4 2 5",
        ])
        .unwrap();
        assert_eq!(mesh.coords().len(), 4);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2, 0, 1, 3]);
    }

    #[test]
    fn unreferenced_vertices_are_dropped() {
        let mesh = Mesh::from_lines(["v 9 9 9", "v 0 0 0", "v 1 0 0", "v 0 1 0", "f 2 3 4"]).unwrap();
        assert_eq!(mesh.coords(), &[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2]);
    }

    #[test]
    fn indices_are_numbered_by_first_reference() {
        let mesh = Mesh::from_lines(["v 0 0 0", "v 1 0 0", "v 0 1 0", "f 3 1 2"]).unwrap();
        assert_eq!(mesh.coords(), &[Vec3::Y, Vec3::ZERO, Vec3::X]);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2]);
        assert_eq!(mesh.mesh_coords(), &[Vec3::Y, Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn signed_zero_is_one_position() {
        let mesh = Mesh::from_lines(["v 0 0 0", "v -0 0 -0", "v 1 0 0", "f 1 3 2"]).unwrap();
        assert_eq!(mesh.coords().len(), 2);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 0]);
    }

    #[test]
    fn nearly_equal_positions_stay_distinct() {
        let mesh = Mesh::from_lines(["v 0 0 0", "v 0.000001 0 0", "v 0 1 0", "f 1 2 3"]).unwrap();
        assert_eq!(mesh.coords().len(), 3);
    }

    #[test]
    fn realign_is_a_fixed_point() {
        let mesh = Mesh::from_lines(QUAD).unwrap();
        let again = mesh.realign();
        assert_eq!(again, mesh);
        assert_eq!(again.realign(), mesh);
    }

    #[test]
    fn triangle_count_matches_flat_buffer() {
        for lines in [&TRIANGLE[..], &QUAD[..], &[][..]] {
            let mesh = Mesh::from_lines(lines.iter()).unwrap();
            assert_eq!(mesh.mesh_coords().len() % 3, 0);
            assert_eq!(mesh.num_triangles(), mesh.mesh_coords().len() / 3);
        }
    }

    #[test]
    fn out_of_range_face_fails() {
        let err = Mesh::from_lines(["v 0 0 0", "v 1 0 0", "f 1 2 3"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::IndexOutOfRange {
                corner: 2,
                index: 3,
                len: 2
            }
        );
    }

    #[test]
    fn face_before_its_vertices_is_accepted() {
        // alignment runs after the whole file is read
        let mesh = Mesh::from_lines(["f 1 2 3", "v 0 0 0", "v 1 0 0", "v 0 1 0"]).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn vertices_are_colored_by_position() {
        let mesh = Mesh::from_lines(["v -1 0 0", "v 0 -2 0", "v 0 0 3", "f 1 2 3"]).unwrap();
        let verts = mesh.to_vertices();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1].pos, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(verts[1].color, crate::core::Color::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Mesh::from_obj("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(Mesh::from_obj_or_empty("does/not/exist.obj")
            .unwrap()
            .is_empty());
    }

    fn write_temp(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.obj", name, std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn latin1_comment_does_not_block_load() {
        let path = write_temp(
            "latin1_comment",
            b"# Exported by caf\xe9 tool\nv 0 0 0\nv 1 0 0\r\nv 0 1 0\nf 1 2 3\n",
        );
        let mesh = Mesh::from_obj(&path).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(Mesh::from_obj_or_empty(&path).unwrap().num_triangles(), 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalid_bytes_in_a_record_are_a_parse_error() {
        let path = write_temp("bad_vertex_byte", b"v 0 0\xff 0\n");
        let err = Mesh::from_obj(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse(ParseError::InvalidFloat { line: 1, .. })
        ));
        assert!(Mesh::from_obj_or_empty(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn bundled_cube_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models/cube.obj");
        let mesh = Mesh::from_obj(path).unwrap();
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.coords().len(), 8);
    }
}
