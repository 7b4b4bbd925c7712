// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! One-call document indexing.
//!
//! [`Indexer::index`] runs the whole pipeline over a document: line map,
//! tokenizer, classifier, builder and property scan. The result is an
//! immutable [`DocumentIndex`] snapshot that a caller swaps in whole.

use log::debug;

use crate::config::IndexerConfig;
use crate::core::line_map::LineMap;
use crate::core::tokenizer::{tokenize_line, CommentState};
use crate::dialect::{Classifier, Dialect};
use crate::index::{
    IndexBuilder, IndexPolicy, OutlineNode, OutlineTree, ScopeId, SymbolDefinition, SymbolTable,
    ROOT_SCOPE,
};
use crate::properties::{
    scan_properties, LanguageProperties, PropertyDiagnostic, DEFAULT_NAMESPACE,
};

#[derive(Debug, Clone)]
pub struct Indexer {
    dialect: Dialect,
    namespace: String,
    extra_equates: Vec<String>,
}

impl Indexer {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            namespace: DEFAULT_NAMESPACE.to_string(),
            extra_equates: Vec::new(),
        }
    }

    pub fn from_config(dialect: Dialect, config: &IndexerConfig) -> Self {
        Self {
            dialect,
            namespace: config.property_namespace().to_string(),
            extra_equates: config.extra_equate_tokens(dialect),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn index(&self, text: &str) -> DocumentIndex {
        let lines = LineMap::new(text);
        let syntax = self.dialect.syntax();
        let mut comment_state = CommentState::default();
        let mut classifier =
            Classifier::new(self.dialect).with_extra_equates(self.extra_equates.iter().cloned());
        let mut builder = IndexBuilder::new(IndexPolicy::for_dialect(self.dialect));
        let mut comments = Vec::new();

        for line in lines.lines() {
            let tokenized = tokenize_line(
                &line.text,
                line.start_offset,
                &syntax.comments,
                &mut comment_state,
            );
            for event in classifier.classify(line.number, &tokenized) {
                builder.accept(event);
            }
            if !tokenized.comment.is_empty() {
                comments.push((line.number, tokenized.comment));
            }
        }

        let last_line = lines.lines().last().map_or(0, |line| line.number);
        let index = builder.finalize_at(text.len(), last_line);
        let properties = scan_properties(
            comments.iter().map(|(number, comment)| (*number, comment.as_str())),
            &self.namespace,
        );
        let property_diagnostics = properties.validate(&self.namespace);
        debug!(
            "indexed {} lines as {}: {} outline nodes, {} symbols, {} properties",
            lines.len(),
            self.dialect,
            index.outline.len(),
            index.symbols.len(),
            properties.len()
        );

        DocumentIndex {
            dialect: self.dialect,
            lines,
            outline: index.outline,
            symbols: index.symbols,
            properties,
            property_diagnostics,
        }
    }
}

/// Index `text` with the settings in `config`.
pub fn index_document(text: &str, dialect: Dialect, config: &IndexerConfig) -> DocumentIndex {
    Indexer::from_config(dialect, config).index(text)
}

/// Snapshot of everything known about one document.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    pub dialect: Dialect,
    pub lines: LineMap,
    pub outline: OutlineTree,
    pub symbols: SymbolTable,
    pub properties: LanguageProperties,
    pub property_diagnostics: Vec<PropertyDiagnostic>,
}

impl DocumentIndex {
    /// Innermost outline node covering `offset`.
    pub fn definition_at(&self, offset: usize) -> Option<&OutlineNode> {
        self.outline.definition_at(offset)
    }

    /// Resolve `name` as seen from `offset`, falling back to the root scope.
    pub fn resolve_at(&self, name: &str, offset: usize) -> Option<&SymbolDefinition> {
        let scope = self.scope_at(offset);
        self.symbols.resolve(name, scope)
    }

    fn scope_at(&self, offset: usize) -> ScopeId {
        let mut node = self.outline.definition_at(offset);
        while let Some(current) = node {
            if let Some(scope) = current.opened_scope {
                return scope;
            }
            node = current.parent.and_then(|id| self.outline.node(id));
        }
        ROOT_SCOPE
    }
}
