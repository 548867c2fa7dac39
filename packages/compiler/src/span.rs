//! Source locations attached to diagnostics and AST nodes.
//!
//! The frontend crate is responsible for turning byte offsets from the
//! external parser into `SourceSpan`s; everything downstream of the
//! frontend only ever reads them.

use std::fmt;
use std::sync::Arc;

/// A source file's path and full text, shared cheaply across every span
/// that points into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Arc<str>,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<Arc<str>>, content: impl Into<Arc<str>>) -> Self {
        SourceFile {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Compute 1-based line/column for a byte offset into this file.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 1usize;
        for (i, ch) in self.content.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

/// A span of source text, resolved to a concrete file/line/column pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl SourceSpan {
    pub fn new(file: &SourceFile, offset: usize, length: usize) -> Self {
        let (line, column) = file.line_col(offset);
        SourceSpan {
            file: file.path.clone(),
            line,
            column,
            offset,
            length,
        }
    }

    /// A span used for synthesized nodes that have no direct source
    /// representation (e.g. the synthesized `_start` body).
    pub fn synthetic(file: &str) -> Self {
        SourceSpan {
            file: Arc::from(file),
            line: 0,
            column: 0,
            offset: 0,
            length: 0,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
