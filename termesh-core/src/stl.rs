/// STL file parser for binary and ASCII formats
///
/// Text grammar accepted by [`parse_ascii_stl`] (tokens separated by any
/// ASCII whitespace, keywords lowercase, no comments):
///
/// ```text
/// stl    := "solid" name* facet* "endsolid" [rest of line] EOF
/// facet  := "facet" "normal" num num num "outer" "loop"
///           vertex vertex vertex "endloop" "endfacet"
/// vertex := "vertex" num num num
/// ```
///
/// A `name` is any token other than `facet` or `endsolid`, so the whole
/// file may sit on one line. Numbers must be finite.
use std::fs;
use std::path::Path;

use log::{debug, info};
use nom::{
    bytes::complete::{is_not, tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::{cut, eof, map, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{length_count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::math::{Pos3, Vec3};

/// Ignored binary header.
pub const HEADER_LEN: usize = 80;
/// Header plus the little-endian triangle count.
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
/// Normal, three vertices and the attribute word.
pub const RECORD_LEN: usize = 50;

/// Read and parse an STL file from disk.
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = parse_stl(&data)?;
    info!("Loaded {} triangles from {}", mesh.len(), path.display());
    Ok(mesh)
}

/// Detect and parse STL data (binary or ASCII)
///
/// Data is binary only when its length is exactly the size implied by the
/// triangle count at offset 80; everything else is parsed as text.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    if is_binary_stl(data) {
        debug!("Parsing {} bytes as binary STL", data.len());
        return parse_binary_stl(data);
    }

    debug!("Parsing {} bytes as ASCII STL", data.len());
    let text = std::str::from_utf8(data).map_err(|e| {
        let valid = &data[..e.valid_up_to()];
        LoadError::Parse {
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
            message: format!("not valid UTF-8 text at byte {}", e.valid_up_to()),
        }
    })?;
    parse_ascii_stl(text)
}

/// Total size a binary STL with this data's declared triangle count must have.
pub fn expected_binary_len(data: &[u8]) -> Option<u64> {
    let count = data.get(HEADER_LEN..PREAMBLE_LEN)?;
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]);
    Some(PREAMBLE_LEN as u64 + RECORD_LEN as u64 * count as u64)
}

pub fn is_binary_stl(data: &[u8]) -> bool {
    data.len() > PREAMBLE_LEN && expected_binary_len(data) == Some(data.len() as u64)
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    let expected = expected_binary_len(data).unwrap_or(PREAMBLE_LEN as u64);
    if (data.len() as u64) < expected {
        return Err(LoadError::Truncated {
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            actual: data.len(),
        });
    }

    let (_, triangles) = binary_stl(data).map_err(|_| LoadError::Truncated {
        expected: expected as usize,
        actual: data.len(),
    })?;
    if let Some(facet) = triangles.iter().position(|t| !is_finite(t)) {
        return Err(LoadError::NonFinite { facet });
    }
    into_mesh(triangles)
}

fn is_finite(triangle: &Triangle) -> bool {
    triangle
        .normal
        .iter()
        .chain(triangle.vertices.iter().flat_map(|v| v.position.coords.iter()))
        .all(|c| c.is_finite())
}

fn binary_stl(input: &[u8]) -> IResult<&[u8], Vec<Triangle>> {
    preceded(take(HEADER_LEN), length_count(le_u32, binary_facet))(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (normal, a, b, c, attribute)) =
        tuple((le_vec3, le_vec3, le_vec3, le_vec3, le_u16))(input)?;

    let vertices = [a, b, c].map(|v| Vertex::from(Pos3::from(v)));
    let mut triangle = Triangle::with_normal(vertices, normal);
    triangle.attribute = attribute;
    Ok((input, triangle))
}

fn le_vec3(input: &[u8]) -> IResult<&[u8], Vec3> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| Vec3::new(x, y, z))(input)
}

/// Encode a mesh as binary STL. Inverse of [`parse_binary_stl`].
pub fn encode_binary_stl(mesh: &Mesh, header: &[u8; HEADER_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(PREAMBLE_LEN + RECORD_LEN * mesh.len());
    out.extend_from_slice(header);
    out.extend_from_slice(&(mesh.len() as u32).to_le_bytes());

    for triangle in &mesh.triangles {
        let coords = triangle
            .normal
            .iter()
            .chain(triangle.vertices.iter().flat_map(|v| v.position.coords.iter()));
        for c in coords {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out.extend_from_slice(&triangle.attribute.to_le_bytes());
    }

    out
}

type TextResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, LoadError> {
    match ascii_stl(input) {
        Ok((_, triangles)) => into_mesh(triangles),
        Err(e) => Err(text_error(input, e)),
    }
}

fn ascii_stl(input: &str) -> TextResult<'_, Vec<Triangle>> {
    let (input, _) = keyword("solid")(input)?;
    let (input, _) = many0(name_token)(input)?;
    let (input, triangles) = many0(facet)(input)?;
    let (input, _) = keyword("endsolid")(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = context("end of file", eof)(input)?;

    Ok((input, triangles))
}

fn facet(input: &str) -> TextResult<'_, Triangle> {
    let (input, _) = keyword("facet")(input)?;
    // Past this point a malformed facet is an error, not the end of the list
    let (input, normal) = cut(preceded(inline_keyword("normal"), vector3))(input)?;
    let (input, _) = cut(tuple((keyword("outer"), inline_keyword("loop"))))(input)?;
    let (input, (v1, v2, v3)) = cut(tuple((vertex, vertex, vertex)))(input)?;
    let (input, _) = cut(tuple((keyword("endloop"), keyword("endfacet"))))(input)?;

    Ok((input, Triangle::with_normal([v1, v2, v3], normal)))
}

fn vertex(input: &str) -> TextResult<'_, Vertex> {
    let (input, position) = preceded(keyword("vertex"), vector3)(input)?;
    Ok((input, Vertex::from(Pos3::from(position))))
}

fn vector3(input: &str) -> TextResult<'_, Vec3> {
    let (input, (x, y, z)) = tuple((number, number, number))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn number(input: &str) -> TextResult<'_, f32> {
    // `float` also takes nan and inf spellings
    context(
        "number",
        preceded(multispace1, verify(float, |f: &f32| f.is_finite())),
    )(input)
}

/// One word of the solid's name; stops at the first structural keyword.
fn name_token(input: &str) -> TextResult<'_, &str> {
    preceded(
        multispace1,
        verify(is_not(" \t\r\n"), |word: &str| {
            word != "facet" && word != "endsolid"
        }),
    )(input)
}

/// Keyword starting a new token, possibly on a new line.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> TextResult<'a, &'a str> {
    context(word, preceded(multispace0, tag(word)))
}

/// Second word of a two-word keyword such as `facet normal`.
fn inline_keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> TextResult<'a, &'a str> {
    context(word, preceded(multispace1, tag(word)))
}

fn text_error(source: &str, err: nom::Err<VerboseError<&str>>) -> LoadError {
    let error = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => {
            return LoadError::Parse {
                line: source.lines().count().max(1),
                message: "unexpected end of input".to_string(),
            }
        }
    };

    let expected = error
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .unwrap_or("STL token");
    let remaining = error
        .errors
        .first()
        .map(|(rest, _)| rest.trim_start())
        .unwrap_or(source);
    let found = match remaining.split_whitespace().next() {
        Some(token) => format!("`{}`", token),
        None => "end of input".to_string(),
    };

    LoadError::Parse {
        line: line_of(source, remaining),
        message: format!("expected {}, found {}", expected, found),
    }
}

/// 1-based line on which `rest` (a suffix of `source`) begins.
fn line_of(source: &str, rest: &str) -> usize {
    let offset = source.len().saturating_sub(rest.len());
    source[..offset].matches('\n').count() + 1
}

fn into_mesh(triangles: Vec<Triangle>) -> Result<Mesh, LoadError> {
    if triangles.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Mesh::from(triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build binary STL bytes from `[normal, v1, v2, v3]` float records.
    fn binary(header: &[u8], records: &[[f32; 12]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[..header.len()].copy_from_slice(header);
        data.extend_from_slice(&(records.len() as u32).to_le_bytes());
        for (i, record) in records.iter().enumerate() {
            for f in record {
                data.extend_from_slice(&f.to_le_bytes());
            }
            data.extend_from_slice(&(i as u16 * 7).to_le_bytes());
        }
        data
    }

    const UNIT: [f32; 12] = [
        0.0, 0.0, 1.0, -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0,
    ];

    const ASCII: &str = "solid part\r\n\
        \tfacet normal 0 0 1\r\n\
        \t\touter loop\r\n\
        \t\t\tvertex -1 -1 0\r\n\
        \t\t\tvertex 1.0e0 -1 0\r\n\
        \t\t\tvertex 0 1 0\r\n\
        \t\tendloop\r\n\
        \tendfacet\r\n\
        facet normal 0 0 -1 outer loop vertex 0 0 0 vertex 0 1 0 vertex 1 0 0 endloop endfacet\n\
        endsolid part\n";

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        assert!(matches!(parse_binary_stl(&data), Err(LoadError::Empty)));
        // 84 bytes is not "more than the preamble", so detection falls to text
        assert!(!is_binary_stl(&data));
    }

    #[test]
    fn test_parse_binary_triangle() {
        let data = binary(b"binary", &[UNIT]);
        assert!(is_binary_stl(&data));

        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.len(), 1);
        let t = &mesh.triangles[0];
        assert_eq!(t.normal, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(t.vertices[1].position, Pos3::new(1.0, -1.0, 0.0));
        assert!(t.vertices.iter().all(|v| v.normal.is_none()));
    }

    #[test]
    fn test_binary_header_starting_with_solid_is_binary() {
        let data = binary(b"solid exported by a CAD tool", &[UNIT, UNIT]);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.triangles[1].attribute, 7);
    }

    #[test]
    fn test_binary_round_trip() {
        let records = [
            UNIT,
            [0.25, -0.5, 0.75, 1.5, 2.5, -3.5, 1e-7, -0.0, 42.0, 9.0, 8.0, -7.125],
            [0.0; 12],
        ];
        let header = [b'x'; HEADER_LEN];
        let data = binary(&header, &records);

        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(encode_binary_stl(&mesh, &header), data);
    }

    #[test]
    fn test_truncated_binary() {
        let mut data = binary(b"", &[UNIT, UNIT]);
        data.truncate(84 + 50 + 20);

        assert!(!is_binary_stl(&data));
        assert!(matches!(
            parse_binary_stl(&data),
            Err(LoadError::Truncated { expected: 184, actual: 154 })
        ));
        // Auto-detection routes it to the text parser, which rejects it too
        assert!(parse_stl(&data).is_err());
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = parse_stl(ASCII.as_bytes()).unwrap();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.triangles[0].normal, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.triangles[0].vertices[1].position, Pos3::new(1.0, -1.0, 0.0));
        assert_eq!(mesh.triangles[1].normal, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(mesh.triangles[1].vertices[2].position, Pos3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ascii_without_names() {
        let text = "solid\nfacet normal 1 0 0\nouter loop\nvertex 0 0 0\nvertex 0 1 0\nvertex 0 0 1\nendloop\nendfacet\nendsolid";
        assert_eq!(parse_ascii_stl(text).unwrap().len(), 1);
    }

    #[test]
    fn test_ascii_missing_vertex() {
        let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\nendsolid t\n";
        match parse_stl(text.as_bytes()) {
            Err(LoadError::Parse { line, message }) => {
                assert_eq!(line, 6);
                assert!(message.contains("vertex"), "{}", message);
                assert!(message.contains("endloop"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_ascii_bad_number() {
        let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n";
        match parse_ascii_stl(text) {
            Err(LoadError::Parse { line, message }) => {
                assert_eq!(line, 4);
                assert!(message.contains("number"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_ascii_single_line() {
        let text = "solid t facet normal 0 0 1 outer loop vertex 0 0 0 vertex 1 0 0 vertex 0 1 0 endloop endfacet endsolid t";
        let mesh = parse_ascii_stl(text).unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.triangles[0].vertices[2].position, Pos3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ascii_multi_word_name() {
        let text = ASCII.replacen("solid part", "solid my part v2", 1);
        assert_eq!(parse_ascii_stl(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_ascii_non_finite_numbers() {
        for token in ["nan", "inf", "-infinity", "NaN"] {
            let text = format!(
                "solid t\nfacet normal 0 0 1\nouter loop\nvertex {} 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n",
                token
            );
            match parse_stl(text.as_bytes()) {
                Err(LoadError::Parse { line, message }) => {
                    assert_eq!(line, 4, "{}", token);
                    assert!(message.contains("number"), "{}: {}", token, message);
                }
                other => panic!("{}: expected parse error, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_binary_non_finite_values() {
        let mut bad = UNIT;
        bad[4] = f32::NAN;
        let data = binary(b"", &[UNIT, bad]);
        assert!(matches!(parse_stl(&data), Err(LoadError::NonFinite { facet: 1 })));

        let mut bad = UNIT;
        bad[0] = f32::INFINITY;
        let data = binary(b"", &[bad]);
        assert!(matches!(parse_stl(&data), Err(LoadError::NonFinite { facet: 0 })));
    }

    #[test]
    fn test_ascii_keywords_are_case_sensitive() {
        let text = ASCII.replace("endsolid", "ENDSOLID");
        assert!(matches!(
            parse_ascii_stl(&text),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_ascii_trailing_garbage() {
        let text = format!("{}extra", ASCII);
        assert!(parse_ascii_stl(&text).is_err());
    }

    #[test]
    fn test_ascii_no_facets() {
        assert!(matches!(
            parse_ascii_stl("solid empty\nendsolid empty\n"),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_stl(&[]), Err(LoadError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_invalid_utf8_text() {
        assert!(matches!(
            parse_stl(&[b's', 0xff, 0xfe]),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_stl("/nonexistent/termesh/model.stl").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("model.stl"));
    }
}
