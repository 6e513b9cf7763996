/// Mesh loading errors
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a mesh could not be loaded. Loading never yields a partial mesh.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// Text STL did not match the expected keyword/number structure.
    Parse { line: usize, message: String },
    /// Binary data shorter than its declared triangle count requires.
    ///
    /// Only [`parse_binary_stl`](crate::stl::parse_binary_stl) reports this.
    /// [`parse_stl`](crate::stl::parse_stl) treats data whose length does not
    /// match its count as text, so there it surfaces as [`LoadError::Parse`].
    Truncated { expected: usize, actual: usize },
    /// Binary facet record (0-based) holding a NaN or infinite float.
    NonFinite { facet: usize },
    /// Well-formed input containing no triangles.
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            LoadError::Parse { line, message } => {
                write!(f, "parse error on line {}: {}", line, message)
            }
            LoadError::Truncated { expected, actual } => write!(
                f,
                "binary STL truncated: expected {} bytes, got {}",
                expected, actual
            ),
            LoadError::NonFinite { facet } => {
                write!(f, "binary STL facet {} has a non-finite value", facet)
            }
            LoadError::Empty => write!(f, "mesh contains no triangles"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
