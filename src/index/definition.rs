// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Label,
    Equate,
    Macro,
    Procedure,
    EnumSection,
    StructureSection,
    LocalSection,
    SourceInclude,
    BinaryInclude,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Label => "label",
            DefinitionKind::Equate => "equate",
            DefinitionKind::Macro => "macro",
            DefinitionKind::Procedure => "procedure",
            DefinitionKind::EnumSection => "enum",
            DefinitionKind::StructureSection => "structure",
            DefinitionKind::LocalSection => "local",
            DefinitionKind::SourceInclude => "source include",
            DefinitionKind::BinaryInclude => "binary include",
        }
    }

    /// Kinds that can own nested definitions in the outline.
    pub fn is_section(self) -> bool {
        matches!(
            self,
            DefinitionKind::Procedure
                | DefinitionKind::EnumSection
                | DefinitionKind::StructureSection
                | DefinitionKind::LocalSection
        )
    }

    /// Kinds that name something a reference can resolve to.
    pub fn is_symbol(self) -> bool {
        !matches!(
            self,
            DefinitionKind::SourceInclude | DefinitionKind::BinaryInclude
        )
    }
}

/// A definition as found by a classifier, before scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    /// Equate operand, include path, or empty.
    pub value: String,
    pub offset: usize,
    pub line: u32,
    /// 0-based byte column of `offset` within its line.
    pub column: usize,
    pub comment: String,
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>, offset: usize, line: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            value: String::new(),
            offset,
            line,
            column: 0,
            comment: String::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Output of a classifier for one line, consumed by the index builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationEvent {
    Define(Definition),
    OpenSection(Definition),
    CloseSection {
        kind: DefinitionKind,
        line: u32,
        offset: usize,
    },
}

impl ClassificationEvent {
    pub fn definition(&self) -> Option<&Definition> {
        match self {
            ClassificationEvent::Define(def) | ClassificationEvent::OpenSection(def) => Some(def),
            ClassificationEvent::CloseSection { .. } => None,
        }
    }

    pub(crate) fn definition_mut(&mut self) -> Option<&mut Definition> {
        match self {
            ClassificationEvent::Define(def) | ClassificationEvent::OpenSection(def) => Some(def),
            ClassificationEvent::CloseSection { .. } => None,
        }
    }
}
