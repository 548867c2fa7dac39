//! The `CompilerHost`-style abstraction the driver reads source files
//! through, so tests can supply in-memory files without touching disk and
//! a future language-server integration can supply an editor's unsaved
//! buffers instead.

use std::path::Path;
use udon_compiler::CompileError;

pub trait SourceReader {
    /// Every file this reader knows about, in a stable order; `_start`
    /// materialization order for non-literal top-level constants follows
    /// this order.
    fn file_paths(&self) -> Vec<String>;

    fn read(&self, path: &str) -> Result<String, CompileError>;
}

/// Reads real files off disk, given an explicit list of paths (typically
/// `CompilerConfig::source_files`).
pub struct FsSourceReader {
    paths: Vec<String>,
}

impl FsSourceReader {
    pub fn new(paths: Vec<String>) -> Self {
        FsSourceReader { paths }
    }
}

impl SourceReader for FsSourceReader {
    fn file_paths(&self) -> Vec<String> {
        self.paths.clone()
    }

    fn read(&self, path: &str) -> Result<String, CompileError> {
        std::fs::read_to_string(Path::new(path)).map_err(|e| CompileError::ConfigurationError {
            message: format!("failed to read '{}': {}", path, e),
        })
    }
}

/// An in-memory reader for tests and embedding scenarios, keyed by path in
/// insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemorySourceReader {
    files: Vec<(String, String)>,
}

impl InMemorySourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }
}

impl SourceReader for InMemorySourceReader {
    fn file_paths(&self) -> Vec<String> {
        self.files.iter().map(|(p, _)| p.clone()).collect()
    }

    fn read(&self, path: &str) -> Result<String, CompileError> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| CompileError::ConfigurationError {
                message: format!("unknown source file '{}'", path),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_reader_preserves_insertion_order() {
        let reader = InMemorySourceReader::new().add("b.ts", "").add("a.ts", "");
        assert_eq!(reader.file_paths(), vec!["b.ts".to_string(), "a.ts".to_string()]);
    }
}
