// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Source outline, symbol index and compiler-log parsing for 6502
//! assembler dialects and Mad Pascal.
//!
//! The usual entry point is [`document::index_document`], which tokenizes,
//! classifies and indexes one document. [`compiler_log::parse_log`] turns
//! compiler output into diagnostics and [`markers::resolve_markers`]
//! anchors them in a document.

pub mod cli;
pub mod compiler_log;
pub mod config;
pub mod core;
pub mod dialect;
pub mod document;
pub mod index;
pub mod markers;
pub mod properties;
pub mod report;
