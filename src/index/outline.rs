// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Arena-backed outline tree.

use serde::Serialize;

use super::symbol_table::{ScopeId, SymbolDefinition};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub definition: SymbolDefinition,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    /// End of the span the node covers: the close offset for sections, the
    /// end of the name for leaves.
    pub end_offset: usize,
    pub end_line: u32,
    /// Scope opened by a section node.
    #[serde(skip)]
    pub opened_scope: Option<ScopeId>,
}

#[derive(Debug, Clone, Default)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    roots: Vec<NodeId>,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent`, keeping insertion order.
    pub fn push(&mut self, definition: SymbolDefinition, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let end_offset = definition.end_offset();
        let end_line = definition.line;
        self.nodes.push(OutlineNode {
            definition,
            parent,
            children: Vec::new(),
            end_offset,
            end_line,
            opened_scope: None,
        });
        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(node) => node.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn set_opened_scope(&mut self, id: NodeId, scope: ScopeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.opened_scope = Some(scope);
        }
    }

    pub(crate) fn close(&mut self, id: NodeId, end_offset: usize, end_line: u32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.end_offset = end_offset.max(node.definition.offset);
            node.end_line = end_line.max(node.definition.line);
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&OutlineNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in source order, depth-first, with their depth.
    pub fn walk(&self) -> Vec<(usize, &OutlineNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> =
            self.roots.iter().rev().map(|&id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            let node = &self.nodes[id];
            out.push((depth, node));
            stack.extend(node.children.iter().rev().map(|&child| (depth + 1, child)));
        }
        out
    }

    /// Innermost node whose span covers `offset`.
    pub fn definition_at(&self, offset: usize) -> Option<&OutlineNode> {
        let mut found = None;
        let mut candidates = self.roots.as_slice();
        loop {
            let Some(&id) = candidates.iter().find(|&&id| self.covers(id, offset)) else {
                return found;
            };
            let node = &self.nodes[id];
            found = Some(node);
            candidates = &node.children;
        }
    }

    fn covers(&self, id: NodeId, offset: usize) -> bool {
        let node = &self.nodes[id];
        node.definition.offset <= offset && offset <= node.end_offset
    }

    /// Nested serialization of the whole tree.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.roots.iter().map(|&id| self.node_json(id)).collect())
    }

    fn node_json(&self, id: NodeId) -> serde_json::Value {
        let node = &self.nodes[id];
        let mut value = serde_json::to_value(node).unwrap_or(serde_json::Value::Null);
        if let serde_json::Value::Object(map) = &mut value {
            if !node.children.is_empty() {
                map.insert(
                    "children".to_string(),
                    serde_json::Value::Array(
                        node.children.iter().map(|&child| self.node_json(child)).collect(),
                    ),
                );
            }
        }
        value
    }
}
