//! Project configuration file (`udonc.toml`): the on-disk shape a user
//! edits, which the driver resolves into the compiler crate's
//! [`CompilerConfig`].

use serde::Deserialize;
use std::path::Path;
use udon_compiler::CompilerConfig;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Source files to compile, relative to the config file's directory.
    pub source_files: Vec<String>,
    /// Entry classes to emit assemblies for; empty means every
    /// `@UdonBehaviour` class reachable in the program.
    pub entry_classes: Vec<String>,
    pub heap_limit: Option<usize>,
    #[serde(rename = "disableTreeShaking")]
    pub disable_tree_shaking: bool,
    /// Directory assembled `.uasm` output is written to.
    pub out_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            source_files: Vec::new(),
            entry_classes: Vec::new(),
            heap_limit: None,
            disable_tree_shaking: false,
            out_dir: "dist".to_string(),
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read '{}': {}", path.display(), e))?;
        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse '{}': {}", path.display(), e))?;
        Ok(config)
    }

    pub fn to_compiler_config(&self) -> CompilerConfig {
        CompilerConfig {
            source_files: self.source_files.clone(),
            entry_classes: self.entry_classes.clone(),
            heap_limit: self.heap_limit,
            disable_tree_shaking: self.disable_tree_shaking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_project_file() {
        let config: ProjectConfig = toml::from_str(
            r#"
            source_files = ["src/Demo.ts"]
            entry_classes = ["Demo"]
            "#,
        )
        .unwrap();
        assert_eq!(config.source_files, vec!["src/Demo.ts".to_string()]);
        assert_eq!(config.out_dir, "dist");
        assert!(!config.disable_tree_shaking);
    }

    #[test]
    fn defaults_are_empty_and_tree_shaking_stays_enabled() {
        let config = ProjectConfig::default();
        assert!(config.source_files.is_empty());
        assert!(!config.disable_tree_shaking);
    }
}
