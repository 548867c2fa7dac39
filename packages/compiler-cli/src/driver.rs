//! Wires the project config, the frontend parser and the compiler
//! pipeline together into the one operation the CLI binary drives: read
//! every configured source file, compile them as one program, write one
//! `.uasm` file per entry class.

use crate::config::ProjectConfig;
use crate::logging::Logger;
use crate::uasm_writer;
use std::path::Path;
use udon_compiler::CompileError;
use udon_frontend::FsSourceReader;

pub struct BuildSummary {
    pub assemblies_written: usize,
    pub warnings: Vec<CompileError>,
}

pub fn run_build(config: &ProjectConfig, project_dir: &Path, logger: &dyn Logger) -> Result<BuildSummary, Vec<CompileError>> {
    if config.source_files.is_empty() {
        return Err(vec![CompileError::ConfigurationError { message: "no source_files configured".to_string() }]);
    }

    let paths: Vec<String> = config
        .source_files
        .iter()
        .map(|f| project_dir.join(f).to_string_lossy().into_owned())
        .collect();
    logger.info(&format!("reading {} source file(s)", paths.len()));

    let reader = FsSourceReader::new(paths);
    let programs = udon_frontend::parse_all(&reader)?;
    logger.debug(&format!("parsed {} program(s)", programs.len()));

    let compiler_config = config.to_compiler_config();
    let output = udon_compiler::compile(programs, &compiler_config)?;

    for warning in &output.warnings {
        logger.warn(&warning.to_string());
    }

    let out_dir = project_dir.join(&config.out_dir);
    std::fs::create_dir_all(&out_dir).map_err(|e| {
        vec![CompileError::ConfigurationError { message: format!("failed to create '{}': {}", out_dir.display(), e) }]
    })?;

    for assembly in &output.assemblies {
        let rendered = uasm_writer::render(assembly);
        let file_path = out_dir.join(format!("{}.uasm", assembly.class_name));
        std::fs::write(&file_path, rendered).map_err(|e| {
            vec![CompileError::ConfigurationError { message: format!("failed to write '{}': {}", file_path.display(), e) }]
        })?;
        logger.info(&format!("wrote {}", file_path.display()));
    }

    Ok(BuildSummary { assemblies_written: output.assemblies.len(), warnings: output.warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullLogger;
    use std::io::Write;

    #[test]
    fn builds_one_uasm_file_per_entry_class_into_the_configured_out_dir() {
        let tmp = std::env::temp_dir().join(format!("udonc-driver-test-{}", std::process::id()));
        std::fs::create_dir_all(&tmp).unwrap();
        let src_path = tmp.join("Demo.ts");
        let mut f = std::fs::File::create(&src_path).unwrap();
        writeln!(
            f,
            "@UdonBehaviour()\nclass Demo extends UdonSharpBehaviour {{\n  Start(): void {{}}\n}}"
        )
        .unwrap();

        let config = ProjectConfig {
            source_files: vec!["Demo.ts".to_string()],
            entry_classes: vec![],
            heap_limit: None,
            disable_tree_shaking: false,
            out_dir: "out".to_string(),
        };

        let summary = run_build(&config, &tmp, &NullLogger).expect("build should succeed");
        assert_eq!(summary.assemblies_written, 1);
        assert!(tmp.join("out").join("Demo.uasm").exists());

        std::fs::remove_dir_all(&tmp).ok();
    }
}
