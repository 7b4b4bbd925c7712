// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Dialect-independent building blocks.
//!
//! # Components
//!
//! - [`line_map`] - Line splitting and offset/position mapping
//! - [`tokenizer`] - Per-line field tokenizer with comment masking
//! - [`text_utils`] - Identifier and whitespace helpers
//! - [`severity`] - Severity taxonomy for diagnostics
//! - [`error`] - Contract and configuration errors

pub mod error;
pub mod line_map;
pub mod severity;
pub mod text_utils;
pub mod tokenizer;

pub use error::IndexError;
pub use line_map::{LineMap, SourceLine};
pub use severity::Severity;
pub use tokenizer::{tokenize, tokenize_line, CommentState, CommentSyntax, TokenizedLine};
