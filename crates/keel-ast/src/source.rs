//! Source handles
//!
//! A [`SourceFile`] is the immutable input a compilation unit is built
//! over. Handles are cheap to clone; every clone shares the same buffer.

use crate::{Position, SourceError, Span};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
struct SourceData {
    path: PathBuf,
    content: Arc<str>,
    /// Byte offset at which every line starts; always begins with 0
    line_starts: Vec<usize>,
    is_virtual: bool,
    is_java: bool,
}

/// Handle to a unit's input buffer
#[derive(Debug, Clone)]
pub struct SourceFile {
    data: Option<Arc<SourceData>>,
}

impl SourceFile {
    /// A persistent source backed by a file on disk
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Arc<str>>) -> Self {
        Self::build(path.into(), content.into(), false)
    }

    /// An in-memory source with no stable on-disk identity (macro output, REPL lines)
    pub fn virtual_file(path: impl Into<PathBuf>, content: impl Into<Arc<str>>) -> Self {
        Self::build(path.into(), content.into(), true)
    }

    /// Load a persistent source from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, content))
    }

    /// The handle of "no source at all"
    pub fn absent() -> Self {
        Self { data: None }
    }

    fn build(path: PathBuf, content: Arc<str>, is_virtual: bool) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let is_java = path.extension().is_some_and(|ext| ext == "java");
        Self {
            data: Some(Arc::new(SourceData {
                path,
                content,
                line_starts,
                is_virtual,
                is_java,
            })),
        }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_virtual(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.is_virtual)
    }

    pub fn is_java(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.is_java)
    }

    pub fn path(&self) -> Option<&Path> {
        self.data.as_deref().map(|d| d.path.as_path())
    }

    pub fn content(&self) -> &str {
        self.data.as_deref().map_or("", |d| &d.content)
    }

    pub fn len(&self) -> usize {
        self.content().len()
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty()
    }

    /// Text covered by `span`
    ///
    /// Empty, inverted, out-of-range and non-character-aligned spans all
    /// yield `""`.
    pub fn text(&self, span: Span) -> &str {
        if span.is_empty() {
            return "";
        }
        self.content().get(span.start..span.end).unwrap_or("")
    }

    /// Resolve a byte offset to a line/column position
    ///
    /// Offsets past the end clamp to the end of the buffer. Offsets inside a
    /// multi-byte character resolve to the start of that character.
    pub fn position(&self, offset: usize) -> Position {
        let Some(data) = self.data.as_deref() else {
            return Position::NONE;
        };
        let content = &*data.content;
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }

        let line_index = match data.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let line_start = data.line_starts[line_index];
        let column = content[line_start..offset].chars().count() + 1;

        Position {
            offset,
            line: (line_index + 1) as u32,
            column: column as u32,
        }
    }

    /// Number of lines in the buffer (an empty buffer has one line)
    pub fn line_count(&self) -> usize {
        self.data.as_deref().map_or(0, |d| d.line_starts.len())
    }

    /// Whether two handles refer to the same buffer
    pub fn same_as(&self, other: &SourceFile) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str("<no file>"),
        }
    }
}
