// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Scoped symbol table with first-definition-wins semantics.

use std::collections::HashMap;

use serde::Serialize;

use super::definition::{Definition, DefinitionKind};

pub type ScopeId = usize;

/// The document-level scope every other scope descends from.
pub const ROOT_SCOPE: ScopeId = 0;

/// A later definition that lost to an earlier one of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub name: String,
    pub scope_id: ScopeId,
    pub line: u32,
    pub offset: usize,
    pub kind: DefinitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub value: String,
    pub offset: usize,
    pub line: u32,
    pub column: usize,
    pub comment: String,
    pub scope_id: ScopeId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Conflict>,
}

impl SymbolDefinition {
    pub fn from_definition(def: Definition, scope_id: ScopeId) -> Self {
        Self {
            name: def.name,
            kind: def.kind,
            value: def.value,
            offset: def.offset,
            line: def.line,
            column: def.column,
            comment: def.comment,
            scope_id,
            conflicts: Vec::new(),
        }
    }

    pub fn end_offset(&self) -> usize {
        self.offset + self.name.len()
    }

    fn conflict(&self) -> Conflict {
        Conflict {
            name: self.name.clone(),
            scope_id: self.scope_id,
            line: self.line,
            offset: self.offset,
            kind: self.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    case_sensitive: bool,
    scopes: Vec<Scope>,
    definitions: Vec<SymbolDefinition>,
    by_key: HashMap<(ScopeId, String), usize>,
}

impl SymbolTable {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            scopes: vec![Scope {
                id: ROOT_SCOPE,
                parent: None,
                name: String::new(),
            }],
            definitions: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Open a child scope of `parent` and return its id.
    pub fn push_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            name: name.into(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Insert a definition. Returns `false` when an earlier definition with
    /// the same name in the same scope already exists; the new one is then
    /// recorded as a conflict on the earlier one.
    pub fn insert(&mut self, symbol: SymbolDefinition) -> bool {
        let key = (symbol.scope_id, self.normalize(&symbol.name));
        if let Some(&existing) = self.by_key.get(&key) {
            self.definitions[existing].conflicts.push(symbol.conflict());
            return false;
        }
        self.by_key.insert(key, self.definitions.len());
        self.definitions.push(symbol);
        true
    }

    /// Look a name up in exactly one scope.
    pub fn lookup(&self, name: &str, scope: ScopeId) -> Option<&SymbolDefinition> {
        self.by_key
            .get(&(scope, self.normalize(name)))
            .map(|&idx| &self.definitions[idx])
    }

    /// Look a name up in the root scope.
    pub fn get(&self, name: &str) -> Option<&SymbolDefinition> {
        self.lookup(name, ROOT_SCOPE)
    }

    /// Resolve a name from `scope`, walking outward to the root.
    pub fn resolve(&self, name: &str, scope: ScopeId) -> Option<&SymbolDefinition> {
        let key = self.normalize(name);
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(&idx) = self.by_key.get(&(id, key.clone())) {
                return Some(&self.definitions[idx]);
            }
            current = self.scopes.get(id).and_then(|scope| scope.parent);
        }
        None
    }

    /// Definitions in source order.
    pub fn symbols(&self) -> impl Iterator<Item = &SymbolDefinition> {
        self.definitions.iter()
    }

    pub fn starting_with<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a SymbolDefinition> + 'a {
        let prefix = self.normalize(prefix);
        self.definitions
            .iter()
            .filter(move |symbol| self.normalize(&symbol.name).starts_with(&prefix))
    }

    /// Every recorded conflict with the definition it lost to.
    pub fn conflicts(&self) -> impl Iterator<Item = (&SymbolDefinition, &Conflict)> {
        self.definitions
            .iter()
            .flat_map(|symbol| symbol.conflicts.iter().map(move |conflict| (symbol, conflict)))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn normalize(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }
}
