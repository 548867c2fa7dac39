//! Compiler-wide configuration: the handful of knobs the pipeline reads
//! before lowering anything, deserialized from the project's config file
//! by the CLI layer and passed in here as a plain struct.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Source files compiled as one program, in declaration order for
    /// `_start` constant-materialization ordering (see `lower::unit`).
    pub source_files: Vec<String>,
    /// Entry classes to emit assemblies for; empty means "every
    /// UdonBehaviour class reachable in the program".
    pub entry_classes: Vec<String>,
    /// Soft ceiling override for `backend::heap::UASM_HEAP_LIMIT`; `None`
    /// keeps the built-in default.
    pub heap_limit: Option<usize>,
    /// Disables the method-usage (tree-shaking) pass, keeping every
    /// declared method reachable; useful when diagnosing a usage-analysis
    /// false negative.
    pub disable_tree_shaking: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            source_files: Vec::new(),
            entry_classes: Vec::new(),
            heap_limit: None,
            disable_tree_shaking: false,
        }
    }
}

impl CompilerConfig {
    pub fn heap_limit(&self) -> usize {
        self.heap_limit.unwrap_or(crate::backend::heap::UASM_HEAP_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_tree_shaking_enabled() {
        let config = CompilerConfig::default();
        assert!(!config.disable_tree_shaking);
        assert_eq!(config.heap_limit(), crate::backend::heap::UASM_HEAP_LIMIT);
    }
}
