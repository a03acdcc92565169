//! Line-oriented reader for the subset of Wavefront OBJ the viewer draws:
//! `v x y z` positions and `f a[/b[/c]] ...` faces. Everything else is
//! skipped.

use glam::Vec3;
use log::trace;

use crate::error::ParseError;

/// Raw contents of an OBJ file before alignment. `indices` are already
/// 0-based but not yet checked against `positions`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObjData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<usize>,
}

pub fn parse_lines<I, S>(lines: I) -> Result<ObjData, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data = ObjData::default();

    for (i, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let line_no = i + 1;
        if line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => data.positions.push(parse_vertex(tokens, line_no)?),
            Some("f") => parse_face(tokens, line_no, &mut data.indices)?,
            Some(other) => trace!("line {}: ignoring `{}` record", line_no, other),
            None => {}
        }
    }

    Ok(data)
}

fn parse_vertex<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, ParseError> {
    let mut coords = [0.0f32; 3];
    for (field, coord) in coords.iter_mut().enumerate() {
        let token = tokens.next().ok_or(ParseError::MissingField {
            line,
            record: "v",
            field: field + 1,
        })?;
        *coord = token.parse().map_err(|_| ParseError::InvalidFloat {
            line,
            token: token.to_string(),
        })?;
    }
    // A trailing w or per-vertex color is allowed and dropped.
    Ok(Vec3::from_array(coords))
}

fn parse_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
    indices: &mut Vec<usize>,
) -> Result<(), ParseError> {
    for corner in tokens {
        // texcoord and normal sub-indices are not used by the render path
        let position = corner.split('/').next().unwrap_or_default();
        let index: usize = position.parse().map_err(|_| ParseError::InvalidIndex {
            line,
            token: corner.to_string(),
        })?;
        if index == 0 {
            return Err(ParseError::InvalidIndex {
                line,
                token: corner.to_string(),
            });
        }
        indices.push(index - 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_vertices_and_faces() {
        let data = parse_lines(["v 0 0 0", "v 1 0 0", "v 0 1 0", "f 1 2 3"]).unwrap();
        assert_eq!(data.positions.len(), 3);
        assert_eq!(data.positions[1], Vec3::X);
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn skips_comments_blank_lines_and_other_records() {
        let data = parse_lines([
            "# exported by hand",
            "",
            "o thing",
            "v 1.5 -2 3e-1",
            "vn 0 0 1",
            "vt 0.5 0.5",
            "s off",
            "usemtl none",
        ])
        .unwrap();
        assert_eq!(data.positions, vec![Vec3::new(1.5, -2.0, 0.3)]);
        assert!(data.indices.is_empty());
    }

    #[test]
    fn face_without_corners_adds_nothing() {
        let data = parse_lines(["v 0 0 0", "f", "f   "]).unwrap();
        assert_eq!(data.positions.len(), 1);
        assert!(data.indices.is_empty());
    }

    #[test]
    fn face_sub_indices_are_discarded() {
        let data = parse_lines(["f 1/4/7 2//8 3/6"]).unwrap();
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn extra_vertex_fields_are_ignored() {
        let data = parse_lines(["v 1 2 3 1.0", "v 1 2 3 0.1 0.2 0.3"]).unwrap();
        assert_eq!(data.positions, vec![Vec3::new(1.0, 2.0, 3.0); 2]);
    }

    #[test]
    fn short_vertex_record_fails() {
        let err = parse_lines(["v 0 0 0", "v 1 2"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                line: 2,
                record: "v",
                field: 3
            }
        );
    }

    #[test]
    fn non_numeric_coordinate_fails() {
        let err = parse_lines(["v 0 zero 0"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidFloat {
                line: 1,
                token: "zero".into()
            }
        );
    }

    #[test]
    fn bad_face_indices_fail() {
        assert!(matches!(
            parse_lines(["f 1 x 3"]),
            Err(ParseError::InvalidIndex { line: 1, .. })
        ));
        assert!(matches!(
            parse_lines(["f 0 1 2"]),
            Err(ParseError::InvalidIndex { line: 1, .. })
        ));
        assert!(matches!(
            parse_lines(["f -1 -2 -3"]),
            Err(ParseError::InvalidIndex { line: 1, .. })
        ));
    }
}
