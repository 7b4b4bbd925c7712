// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use log::debug;

use crate::dialect::{Dialect, LocalVisibility};

use super::definition::{ClassificationEvent, Definition, DefinitionKind};
use super::outline::{NodeId, OutlineTree};
use super::symbol_table::{ScopeId, SymbolDefinition, SymbolTable, ROOT_SCOPE};

/// Scoping rules the builder applies to definitions inside sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPolicy {
    pub visibility: LocalVisibility,
    pub case_sensitive: bool,
}

impl IndexPolicy {
    pub fn for_dialect(dialect: Dialect) -> Self {
        let syntax = dialect.syntax();
        Self {
            visibility: syntax.visibility,
            case_sensitive: syntax.case_sensitive_symbols,
        }
    }

    fn scope_for(&self, name: &str, current: ScopeId) -> ScopeId {
        match self.visibility {
            LocalVisibility::ScopedAll => current,
            LocalVisibility::LocalPrefix(prefixes) => {
                if prefixes.iter().any(|prefix| name.starts_with(prefix)) {
                    current
                } else {
                    ROOT_SCOPE
                }
            }
            LocalVisibility::Global => ROOT_SCOPE,
        }
    }
}

/// Outline and symbol table of one document.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    pub outline: OutlineTree,
    pub symbols: SymbolTable,
}

#[derive(Debug, Clone, Copy)]
struct OpenSection {
    kind: DefinitionKind,
    node: NodeId,
    scope: ScopeId,
}

/// Incremental form of [`build_index`].
#[derive(Debug)]
pub struct IndexBuilder {
    policy: IndexPolicy,
    outline: OutlineTree,
    symbols: SymbolTable,
    open: Vec<OpenSection>,
    last_offset: usize,
    last_line: u32,
}

impl IndexBuilder {
    pub fn new(policy: IndexPolicy) -> Self {
        Self {
            policy,
            outline: OutlineTree::new(),
            symbols: SymbolTable::new(policy.case_sensitive),
            open: Vec::new(),
            last_offset: 0,
            last_line: 0,
        }
    }

    fn current_scope(&self) -> ScopeId {
        self.open.last().map_or(ROOT_SCOPE, |section| section.scope)
    }

    fn current_node(&self) -> Option<NodeId> {
        self.open.last().map(|section| section.node)
    }

    pub fn accept(&mut self, event: ClassificationEvent) {
        match event {
            ClassificationEvent::Define(def) => {
                self.track(def.offset + def.name.len(), def.line);
                self.place(def);
            }
            ClassificationEvent::OpenSection(def) => {
                self.track(def.offset + def.name.len(), def.line);
                let kind = def.kind;
                let name = def.name.clone();
                let parent_scope = self.current_scope();
                let node = self.place(def);
                let scope = self.symbols.push_scope(parent_scope, name);
                self.outline.set_opened_scope(node, scope);
                self.open.push(OpenSection { kind, node, scope });
            }
            ClassificationEvent::CloseSection { kind, line, offset } => {
                self.track(offset, line);
                let Some(position) = self.open.iter().rposition(|open| open.kind == kind) else {
                    debug!("line {line}: ignoring close of unopened {} section", kind.as_str());
                    return;
                };
                for section in self.open.drain(position..).rev() {
                    self.outline.close(section.node, offset, line);
                }
            }
        }
    }

    fn track(&mut self, offset: usize, line: u32) {
        self.last_offset = self.last_offset.max(offset);
        self.last_line = self.last_line.max(line);
    }

    /// Add a definition to the outline under the innermost open section and,
    /// when it names a symbol, to the scope the policy selects.
    fn place(&mut self, def: Definition) -> NodeId {
        let scope = self.policy.scope_for(&def.name, self.current_scope());
        let symbol = SymbolDefinition::from_definition(def, scope);
        if symbol.kind.is_symbol() && !symbol.name.is_empty() {
            if !self.symbols.insert(symbol.clone()) {
                debug!(
                    "line {}: '{}' is already defined in this scope",
                    symbol.line, symbol.name
                );
            }
        }
        self.outline.push(symbol, self.current_node())
    }

    /// Close sections still open at the last offset seen.
    pub fn finalize(self) -> SourceIndex {
        let (offset, line) = (self.last_offset, self.last_line);
        self.finalize_at(offset, line)
    }

    /// Close sections still open at `end_offset`, normally the document end.
    pub fn finalize_at(mut self, end_offset: usize, end_line: u32) -> SourceIndex {
        for section in self.open.drain(..).rev() {
            debug!(
                "closing unterminated {} section at end of input",
                section.kind.as_str()
            );
            self.outline.close(section.node, end_offset, end_line);
        }
        SourceIndex {
            outline: self.outline,
            symbols: self.symbols,
        }
    }
}

/// Fold classification events into an outline and a symbol table.
pub fn build_index<I>(events: I, policy: IndexPolicy) -> SourceIndex
where
    I: IntoIterator<Item = ClassificationEvent>,
{
    let mut builder = IndexBuilder::new(policy);
    for event in events {
        builder.accept(event);
    }
    builder.finalize()
}
