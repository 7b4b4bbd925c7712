// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Symbol index and outline.
//!
//! Classification events are folded into an [`OutlineTree`] that mirrors the
//! section nesting of the source and a [`SymbolTable`] keyed by scope and
//! name.

pub mod builder;
pub mod definition;
pub mod outline;
pub mod symbol_table;

pub use builder::{build_index, IndexBuilder, IndexPolicy, SourceIndex};
pub use definition::{ClassificationEvent, Definition, DefinitionKind};
pub use outline::{NodeId, OutlineNode, OutlineTree};
pub use symbol_table::{Conflict, Scope, ScopeId, SymbolDefinition, SymbolTable, ROOT_SCOPE};
