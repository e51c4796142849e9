//! Diagnostic sink for the Hexen semantic analyzer.
//!
//! The analyzer never aborts on the first problem — it appends a
//! [`Diagnostic`] to a [`DiagnosticEngine`] and keeps going, using
//! [`hexen_ast::NodeId`] (not source text) to identify where a problem was
//! found. Rendering a diagnostic against actual source lines, colors, and
//! file paths is the driver's job (out of scope here, per the analyzer's
//! narrow contract); this crate only owns the records themselves.

use colored::Colorize;
use hexen_ast::NodeId;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
        }
    }
}

/// The taxonomy of user-facing failures the analyzer can diagnose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    MissingExplicitConversion,
    ForbiddenConversion,
    UndeclaredName,
    Redeclaration,
    UseOfUninitialized,
    ImmutabilityViolation,
    MissingTypeAnnotation,
    ControlFlowError,
    ArrayShapeError,
    MissingCopyOperator,
    OverflowInLiteral,
    BooleanConditionRequired,
}

impl ErrorKind {
    /// Short machine-stable tag, handy for tests that assert "which kind of
    /// error fired" without string-matching the prose message.
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type-mismatch",
            ErrorKind::MissingExplicitConversion => "missing-explicit-conversion",
            ErrorKind::ForbiddenConversion => "forbidden-conversion",
            ErrorKind::UndeclaredName => "undeclared-name",
            ErrorKind::Redeclaration => "redeclaration",
            ErrorKind::UseOfUninitialized => "use-of-uninitialized",
            ErrorKind::ImmutabilityViolation => "immutability-violation",
            ErrorKind::MissingTypeAnnotation => "missing-type-annotation",
            ErrorKind::ControlFlowError => "control-flow-error",
            ErrorKind::ArrayShapeError => "array-shape-error",
            ErrorKind::MissingCopyOperator => "missing-copy-operator",
            ErrorKind::OverflowInLiteral => "overflow-in-literal",
            ErrorKind::BooleanConditionRequired => "boolean-condition-required",
        }
    }
}

/// A single diagnostic: what went wrong, at which node, with an optional
/// one-line fix suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: Option<String>,
    pub node: NodeId,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, kind: ErrorKind, message: String, node: NodeId) -> Self {
        Self {
            level,
            kind,
            message,
            suggestion: None,
            node,
            notes: Vec::new(),
        }
    }

    pub fn error(kind: ErrorKind, message: String, node: NodeId) -> Self {
        Self::new(ErrorLevel::Error, kind, message, node)
    }

    pub fn warning(kind: ErrorKind, message: String, node: NodeId) -> Self {
        Self::new(ErrorLevel::Warning, kind, message, node)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.level,
            self.kind.tag(),
            self.message.bold()
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (help: {})", suggestion)?;
        }
        Ok(())
    }
}

/// Collects diagnostics during analysis. Never clears itself mid-analysis;
/// the driver owns when a fresh engine is created — one per module, so
/// modules can be analyzed in parallel.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Info => {}
        }
        log::debug!(
            "diagnostic emitted: {:?} at {:?}: {}",
            diagnostic.kind,
            diagnostic.node,
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn emit_error(&mut self, kind: ErrorKind, message: String, node: NodeId) {
        self.emit(Diagnostic::error(kind, message, node));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Diagnostics in emission order (not guaranteed to be source order
    /// until [`DiagnosticEngine::finish`] is called).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the engine and return diagnostics sorted by node id. For a
    /// single-pass top-down walker that assigns ids in source order, this
    /// is source-position order — the same diagnostic list for the same
    /// input, every time.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.node);
        self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

/// Fuzzy matching for "did you mean?" suggestions on undeclared names.
pub mod fuzzy {
    use strsim::jaro_winkler;

    /// Find similar names by Jaro-Winkler similarity, highest first.
    pub fn find_similar_names(
        target: &str,
        candidates: &[String],
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| (candidate.clone(), jaro_winkler(target, candidate)))
            .filter(|(_, score)| *score > threshold)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_counts_errors_and_warnings_separately() {
        let mut engine = DiagnosticEngine::new();
        engine.emit_error(ErrorKind::TypeMismatch, "mismatch".into(), NodeId(1));
        engine.emit(Diagnostic::warning(
            ErrorKind::ImmutabilityViolation,
            "unused".into(),
            NodeId(2),
        ));
        assert_eq!(engine.error_count(), 1);
        assert_eq!(engine.warning_count(), 1);
        assert!(engine.has_errors());
    }

    #[test]
    fn finish_sorts_by_node_id() {
        let mut engine = DiagnosticEngine::new();
        engine.emit_error(ErrorKind::TypeMismatch, "b".into(), NodeId(5));
        engine.emit_error(ErrorKind::TypeMismatch, "a".into(), NodeId(2));
        let sorted = engine.finish();
        assert_eq!(sorted[0].node, NodeId(2));
        assert_eq!(sorted[1].node, NodeId(5));
    }

    #[test]
    fn fuzzy_match_finds_close_names() {
        let candidates = vec!["flex".to_string(), "flux".to_string(), "other".to_string()];
        let found = fuzzy::find_similar_names("flax", &candidates, 0.7, 3);
        assert!(found.contains(&"flex".to_string()) || found.contains(&"flux".to_string()));
    }
}
