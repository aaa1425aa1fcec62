//! The symbol table.
//!
//! XuLang has a single flat scope: every variable is declared once in the
//! `DECLARACOES` section and visible everywhere after it.

use crate::frontend::ast::Type;
use crate::utils::location::Span;
use serde::Serialize;
use std::collections::HashMap;

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// Name as spelled in the declaration
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Span of the declaration
    pub span: Span,
}

/// Mapping from name to declared type, iterated in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`. On a duplicate the existing entry is kept and
    /// returned as the error.
    pub fn declare(&mut self, name: &str, ty: Type, span: Span) -> Result<(), &Symbol> {
        if let Some(&i) = self.index.get(name) {
            return Err(&self.symbols[i]);
        }
        self.index.insert(name.to_string(), self.symbols.len());
        self.symbols.push(Symbol { name: name.to_string(), ty, span });
        Ok(())
    }

    /// Look up a symbol.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    /// Type of a declared name.
    pub fn type_of(&self, name: &str) -> Option<Type> {
        self.get(name).map(|s| s.ty)
    }

    /// Symbols in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Number of declared symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
