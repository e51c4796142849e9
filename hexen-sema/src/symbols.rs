//! Scope stack and symbol table.

use crate::types::Type;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub declared_type: Type,
    pub is_mutable: bool,
    pub is_initialized: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, declared_type: Type, is_mutable: bool) -> Self {
        Self {
            name: name.into(),
            declared_type,
            is_mutable,
            is_initialized: true,
        }
    }

}

/// Why a [`SymbolTable::declare`] call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareError {
    Redeclaration,
}

/// A stack of lexical scopes, innermost last. Functions and blocks each push
/// one; shadowing across scopes is legal, redeclaration within the same
/// scope is not.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
    /// Function signatures, collected in a pre-pass so calls can reference
    /// functions declared later in the program.
    functions: HashMap<String, FunctionSignature>,
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<(String, Type)>,
    pub return_type: Type,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        log::trace!("entering scope (depth {})", self.scopes.len() + 1);
        self.scopes.push(HashMap::new());
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
        log::trace!("left scope (depth {})", self.scopes.len());
    }

    /// Declares `symbol` in the innermost scope. Fails only if a symbol with
    /// the same name already exists in that exact scope — shadowing an
    /// outer one is always fine.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), DeclareError> {
        let scope = self
            .scopes
            .last_mut()
            .expect("declare called with no active scope");
        if scope.contains_key(&symbol.name) {
            return Err(DeclareError::Redeclaration);
        }
        log::debug!("declaring `{}` : {}", symbol.name, symbol.declared_type);
        scope.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Looks up `name` from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Marks `name` initialized in whichever scope currently holds it.
    /// No-op if the name isn't declared (callers check that separately).
    pub fn mark_initialized(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(symbol) = scope.get_mut(name) {
                symbol.is_initialized = true;
                return;
            }
        }
    }

    /// All names visible from the current scope chain, for fuzzy "did you
    /// mean?" suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.keys().cloned())
            .collect()
    }

    pub fn declare_function(&mut self, name: impl Into<String>, sig: FunctionSignature) {
        self.functions.insert(name.into(), sig);
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }
}
