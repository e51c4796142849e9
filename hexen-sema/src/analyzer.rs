//! Top-level driver: wires the symbol table, diagnostic engine, and config
//! together and walks a [`hexen_ast::Program`].

use crate::config::AnalyzerConfig;
use crate::function;
use crate::symbols::SymbolTable;
use hexen_ast::{NodeId, Program};
use hexen_diagnostics::{fuzzy, Diagnostic, DiagnosticEngine, ErrorKind};

pub struct Analyzer {
    pub symbols: SymbolTable,
    pub diagnostics: DiagnosticEngine,
    pub config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            symbols: SymbolTable::new(),
            diagnostics: DiagnosticEngine::new(),
            config,
        }
    }

    /// Emits an [`ErrorKind::UndeclaredName`] diagnostic, attaching a fuzzy
    /// "did you mean?" suggestion drawn from every name currently visible
    /// (locals in scope plus declared functions).
    pub fn undeclared_name(&mut self, name: &str, node: NodeId) {
        let mut candidates = self.symbols.visible_names();
        candidates.extend(self.symbols.function_names());
        let suggestions = fuzzy::find_similar_names(
            name,
            &candidates,
            self.config.fuzzy_threshold,
            self.config.fuzzy_max_suggestions,
        );
        let mut diagnostic = Diagnostic::error(
            ErrorKind::UndeclaredName,
            format!("undeclared name `{}`", name),
            node,
        );
        if let Some(first) = suggestions.first() {
            diagnostic = diagnostic.with_suggestion(format!("did you mean `{}`?", first));
        }
        self.diagnostics.emit(diagnostic);
    }
}

/// Analyzes a whole program and returns its diagnostics in source order.
/// This is the analyzer's only external entry point: it takes an AST
/// and returns diagnostics, nothing else.
pub fn analyze_program(program: &Program, config: AnalyzerConfig) -> Vec<Diagnostic> {
    let mut analyzer = Analyzer::new(config);
    function::collect_signatures(&mut analyzer, program);
    for func in &program.funcs {
        function::analyze_function(&mut analyzer, func);
    }
    analyzer.diagnostics.finish()
}
