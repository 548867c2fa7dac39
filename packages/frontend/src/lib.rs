//! Surface-language front end: turns source text into the compiler
//! crate's reduced [`udon_compiler::ast::Program`] trees.
//!
//! This crate owns exactly one concern, parsing and AST reduction; it has
//! no opinion on where source files live (see [`source::SourceReader`])
//! or what happens to the programs it produces once handed back to the
//! CLI driver.

pub mod convert;
pub mod decorators;
pub mod source;
pub mod types_conv;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use udon_compiler::ast::Program;
use udon_compiler::span::SourceFile;
use udon_compiler::CompileError;

pub use source::{FsSourceReader, InMemorySourceReader, SourceReader};

/// Parse and convert a single file's source text into a reduced
/// [`Program`]. The path's extension decides whether the parser runs in
/// TypeScript or plain JavaScript mode; anything unrecognized defaults to
/// TypeScript, since that's the only surface this compiler targets.
pub fn parse_source(path: &str, content: &str) -> Result<Program, CompileError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::default().with_typescript(true));
    let ret = Parser::new(&allocator, content, source_type).parse();

    let file = SourceFile::new(path.to_string(), content.to_string());

    if !ret.errors.is_empty() {
        let message = ret.errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        return Err(CompileError::UnsupportedSyntax {
            span: udon_compiler::span::SourceSpan::synthetic(path),
            message: format!("parse error: {}", message),
            remediation: None,
        });
    }

    convert::convert_program(&file, &ret.program)
}

/// Read and convert every file a [`SourceReader`] knows about, in its
/// stable order, collecting every file's errors rather than stopping at
/// the first broken file.
pub fn parse_all(reader: &dyn SourceReader) -> Result<Vec<Program>, Vec<CompileError>> {
    let mut programs = Vec::new();
    let mut errors = Vec::new();

    for path in reader.file_paths() {
        let content = match reader.read(&path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        match parse_source(&path, &content) {
            Ok(program) => programs.push(program),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(programs)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_behaviour_into_one_class() {
        let source = r#"
            @UdonBehaviour()
            class Demo extends UdonSharpBehaviour {
                health: Int32 = 100;

                Start(): void {
                    this.health = 100;
                }
            }
        "#;
        let program = parse_source("demo.ts", source).expect("should parse");
        assert_eq!(program.classes.len(), 1);
        assert_eq!(program.classes[0].name, "Demo");
        assert_eq!(program.classes[0].methods[0].name, "Start");
    }

    #[test]
    fn rejects_a_labeled_statement_as_unsupported_syntax() {
        let source = r#"
            class Demo extends UdonSharpBehaviour {
                Start(): void {
                    outer: while (true) { break outer; }
                }
            }
        "#;
        let err = parse_source("demo.ts", source).expect_err("labeled statements are unsupported");
        assert!(matches!(err, CompileError::UnsupportedSyntax { .. }));
    }

    #[test]
    fn parse_all_collects_errors_from_every_broken_file_rather_than_stopping_at_the_first() {
        let reader = InMemorySourceReader::new()
            .add("a.ts", "class A extends UdonSharpBehaviour { Start(): void { label: while(true) {} } }")
            .add("b.ts", "class B extends UdonSharpBehaviour { Start(): void { label: while(true) {} } }");
        let errors = parse_all(&reader).expect_err("both files are broken");
        assert_eq!(errors.len(), 2);
    }
}
