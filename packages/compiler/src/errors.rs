//! Error taxonomy and the per-run error collector.
//!
//! Frontend phases accumulate into an [`ErrorCollector`] and the pipeline
//! halts before lowering if anything fatal was collected. Lowering, the
//! optimizer and the backend raise [`CompileError`] directly since by that
//! point the program is assumed well-typed and any failure reflects either a
//! still-unsupported surface construct or a genuine bug.

use crate::span::SourceSpan;
use thiserror::Error;

/// One of the abstract error kinds from the design's error taxonomy.
#[derive(Debug, Error, Clone)]
pub enum CompileError {
    /// A surface construct outside the supported subset. Fatal per file.
    #[error("{span}: unsupported syntax: {message}{}", remediation.as_ref().map(|r| format!(" ({r})")).unwrap_or_default())]
    UnsupportedSyntax {
        span: SourceSpan,
        message: String,
        remediation: Option<String>,
    },

    /// An interface/inheritance violation, or another static-type mismatch.
    #[error("{span}: type error: {message}")]
    TypeError { span: SourceSpan, message: String },

    /// An identifier with no binding in scope.
    #[error("{span}: undefined identifier '{name}'")]
    NameError { span: SourceSpan, name: String },

    /// A malformed decorator, duplicate top-level constant, or similar
    /// project-configuration mistake.
    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    /// Non-fatal: the assembled program exceeded `UASM_HEAP_LIMIT`.
    #[error("UASM heap usage {used} exceeds limit {limit}")]
    HeapBudgetExceeded {
        used: usize,
        limit: usize,
        breakdown: String,
    },

    /// A compiler invariant was violated; this indicates a bug in the
    /// compiler itself, not in the input program.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompileError::HeapBudgetExceeded { .. })
    }
}

/// Accumulates diagnostics over the lifetime of a single compilation run.
///
/// Frontend phases (registry population, inheritance validation) push every
/// error they find rather than failing on the first one, so that a single
/// invocation surfaces as many problems as possible.
#[derive(Debug, Default, Clone)]
pub struct ErrorCollector {
    errors: Vec<CompileError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(CompileError::is_fatal)
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter().filter(|e| !e.is_fatal())
    }

    /// Consume the collector, turning it into `Err` if any fatal error was
    /// recorded, or `Ok(warnings)` otherwise.
    pub fn into_result(self) -> Result<Vec<CompileError>, Vec<CompileError>> {
        if self.has_fatal() {
            Err(self.errors)
        } else {
            Ok(self.errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
