//! OBJ reader producing triangle-expanded position/uv/normal streams.
//!
//! Supports `v`, `vt`, `vn` and triangular `f v/vt/vn` faces. Attributes must
//! be declared before the faces that use them; input is resolved in one pass.
//! Texture V is negated on read to match DDS row order.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::Context;
use glam::{Vec2, Vec3};

use crate::{
    error::{AssetError, AssetResult, Attribute},
    mesh::IndexedMesh,
};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> anyhow::Result<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    load_obj_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load OBJ file: {}", path.display()))
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> AssetResult<IndexedMesh> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> AssetResult<IndexedMesh> {
    parse_obj(io::Cursor::new(contents))
}

fn parse_obj<R: BufRead>(reader: R) -> AssetResult<IndexedMesh> {
    let mut mesh = IndexedMesh::default();

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => AssetError::MalformedLine {
                line: line_no,
                reason: "not valid UTF-8".into(),
            },
            _ => AssetError::Io(e),
        })?;
        let mut trimmed = line.trim();
        if line_no == 1 {
            trimmed = trimmed.trim_start_matches('\u{feff}').trim_start();
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let [x, y, z] = parse_floats(&mut parts, line_no, ["x", "y", "z"])?;
                mesh.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats(&mut parts, line_no, ["u", "v"])?;
                mesh.uvs.push(Vec2::new(u, -v));
            }
            "vn" => {
                let [nx, ny, nz] = parse_floats(&mut parts, line_no, ["nx", "ny", "nz"])?;
                mesh.normals.push(Vec3::new(nx, ny, nz));
            }
            "f" => {
                let corners: Vec<&str> = parts.collect();
                let corners: [&str; 3] = corners
                    .as_slice()
                    .try_into()
                    .map_err(|_| AssetError::UnsupportedTopology {
                        line: line_no,
                        corners: corners.len(),
                    })?;

                // Resolve every corner before touching the streams.
                let mut resolved = [(Vec3::ZERO, Vec2::ZERO, Vec3::ZERO); 3];
                for (slot, token) in resolved.iter_mut().zip(corners) {
                    let [vi, ti, ni] = parse_corner(token, line_no)?;
                    *slot = (
                        resolve(&mesh.positions, vi, Attribute::Position, line_no)?,
                        resolve(&mesh.uvs, ti, Attribute::TexCoord, line_no)?,
                        resolve(&mesh.normals, ni, Attribute::Normal, line_no)?,
                    );
                }
                for (position, uv, normal) in resolved {
                    mesh.push_corner(position, uv, normal);
                }
            }
            other => {
                log::trace!("OBJ line {}: skipping '{}' directive", line_no, other);
            }
        }
    }

    log::info!(
        "Loaded OBJ: {} positions, {} uvs, {} normals, {} triangles",
        mesh.positions.len(),
        mesh.uvs.len(),
        mesh.normals.len(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

fn malformed(line: usize, reason: impl Into<String>) -> AssetError {
    AssetError::MalformedLine {
        line,
        reason: reason.into(),
    }
}

/// Parse exactly `N` floats; a line with more operands is malformed.
fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    names: [&str; N],
) -> AssetResult<[f32; N]> {
    let mut out = [0.0; N];
    for (value, what) in out.iter_mut().zip(names) {
        let token = parts
            .next()
            .ok_or_else(|| malformed(line_no, format!("missing {} coordinate", what)))?;
        *value = token.parse::<f32>().map_err(|_| {
            malformed(line_no, format!("invalid {} coordinate '{}'", what, token))
        })?;
    }
    let extra = parts.count();
    if extra > 0 {
        return Err(malformed(
            line_no,
            format!("expected {} operands, found {}", N, N + extra),
        ));
    }
    Ok(out)
}

/// Split a `v/vt/vn` corner into its three raw indices.
fn parse_corner(token: &str, line_no: usize) -> AssetResult<[i64; 3]> {
    let mut split = token.split('/');
    let mut out = [0i64; 3];
    for value in out.iter_mut() {
        let raw = split
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                malformed(line_no, format!("face corner '{}' is not v/vt/vn", token))
            })?;
        *value = raw.parse::<i64>().map_err(|_| {
            malformed(line_no, format!("invalid index '{}' in face corner '{}'", raw, token))
        })?;
    }
    if split.next().is_some() {
        return Err(malformed(
            line_no,
            format!("face corner '{}' is not v/vt/vn", token),
        ));
    }
    Ok(out)
}

/// Look up a 1-based index in a pool populated so far.
fn resolve<T: Copy>(pool: &[T], index: i64, attribute: Attribute, line_no: usize) -> AssetResult<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| pool.get(i).copied())
        .ok_or(AssetError::IndexOutOfRange {
            line: line_no,
            attribute,
            index,
            len: pool.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\n\
                            vn 0 0 1\nvn 0 0 1\nvn 0 0 1\nf 1/1/1 2/2/2 3/3/3\n";

    #[test]
    fn parse_simple_triangle() {
        let mesh = load_obj_from_str(TRIANGLE).expect("parse triangle");
        assert_eq!(mesh.vertex_stream(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.uv_stream(), &[0.0, 0.0, 1.0, 0.0, 0.0, -1.0]);
        assert_eq!(mesh.normal_stream(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.positions().len(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn comments_and_unknown_directives_are_skipped() {
        let src = format!("# cube\nmtllib cube.mtl\no Cube\ns off\n\n{TRIANGLE}usemtl Material\n");
        let mesh = load_obj_from_str(&src).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn index_past_pool_is_out_of_range() {
        let src = TRIANGLE.replace("f 1/1/1 2/2/2 3/3/3", "f 1/1/1 2/2/2 4/3/3");
        let err = load_obj_from_str(&src).unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange { line: 10, attribute: Attribute::Position, index: 4, len: 3 }
        ));
    }

    #[test]
    fn zero_and_negative_indices_are_rejected() {
        for corner in ["0/1/1", "-1/1/1"] {
            let src = TRIANGLE.replace("f 1/1/1", &format!("f {corner}"));
            assert!(matches!(
                load_obj_from_str(&src),
                Err(AssetError::IndexOutOfRange { attribute: Attribute::Position, .. })
            ));
        }
        let src = TRIANGLE.replace("2/2/2", "2/2/0");
        assert!(matches!(
            load_obj_from_str(&src),
            Err(AssetError::IndexOutOfRange { attribute: Attribute::Normal, index: 0, .. })
        ));
    }

    #[test]
    fn quads_are_unsupported() {
        let src = format!("{TRIANGLE}v 1 1 0\nf 1/1/1 2/2/2 4/3/3 3/3/3\n");
        assert!(matches!(
            load_obj_from_str(&src),
            Err(AssetError::UnsupportedTopology { line: 12, corners: 4 })
        ));
    }

    #[test]
    fn malformed_lines_carry_line_number() {
        let cases = [
            ("v 1 2\n", 1),
            ("v 0 0 0\nvt 0 x\n", 2),
            ("# c\nvn 0 0\n", 2),
        ];
        for (src, line) in cases {
            match load_obj_from_str(src) {
                Err(AssetError::MalformedLine { line: got, .. }) => assert_eq!(got, line, "{src:?}"),
                other => panic!("expected malformed line for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn corners_without_all_three_indices_are_malformed() {
        for corner in ["1", "1//1", "1/1", "1/1/1/1", "a/1/1"] {
            let src = TRIANGLE.replace("f 1/1/1", &format!("f {corner}"));
            assert!(
                matches!(load_obj_from_str(&src), Err(AssetError::MalformedLine { line: 10, .. })),
                "{corner}"
            );
        }
    }

    #[test]
    fn extra_operands_are_malformed() {
        let cases = [
            ("v 1 0 0", "v 1 0 0 1.0", 2),
            ("vt 1 0", "vt 1 0 0", 5),
            ("vn 0 0 1\nf", "vn 0 0 1 0\nf", 9),
        ];
        for (from, to, line) in cases {
            let src = TRIANGLE.replacen(from, to, 1);
            match load_obj_from_str(&src) {
                Err(AssetError::MalformedLine { line: got, reason }) => {
                    assert_eq!(got, line, "{to:?}");
                    assert!(reason.contains("expected"), "{reason}");
                }
                other => panic!("expected malformed line for {to:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn leading_byte_order_mark_is_stripped() {
        let src = format!("\u{feff}{TRIANGLE}");
        let mesh = load_obj_from_str(&src).unwrap();
        assert_eq!(mesh.positions().len(), 3);
        assert_eq!(mesh.positions()[0], Vec3::ZERO);
        assert_eq!(mesh.triangle_count(), 1);

        let commented = format!("\u{feff}# exported\n{TRIANGLE}");
        assert_eq!(load_obj_from_str(&commented).unwrap().triangle_count(), 1);
    }

    #[test]
    fn oversized_index_is_malformed() {
        let src = TRIANGLE.replace("3/3/3", "99999999999999999999/3/3");
        assert!(matches!(
            load_obj_from_str(&src),
            Err(AssetError::MalformedLine { line: 10, .. })
        ));
    }

    #[test]
    fn face_before_its_attributes_is_rejected() {
        let src = "f 1/1/1 2/2/2 3/3/3\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\n";
        assert!(matches!(
            load_obj_from_str(src),
            Err(AssetError::IndexOutOfRange { line: 1, len: 0, .. })
        ));
    }
}
