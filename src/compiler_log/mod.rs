// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Compiler process log parsing.
//!
//! A dialect's recognizer matches the first line of each diagnostic; lines
//! that match nothing are continuation text of the diagnostic before them.

mod parser;
mod patterns;

pub use parser::{parse_log, Diagnostic, LogDiagnostics};
