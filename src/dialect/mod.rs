// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Supported assembler and compiler dialects.
//!
//! Each dialect is a variant of the closed [`Dialect`] enum with a static
//! [`DialectSyntax`] table. The table is read-only process-wide state; all
//! per-parse state lives in a [`Classifier`].

pub mod classifier;
mod pascal;
pub mod syntax;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::IndexError;

pub use classifier::{BlockState, Classifier};
pub use syntax::{DialectSyntax, IncludeToken, LocalVisibility, SectionTokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Acme,
    Asm6,
    Atasm,
    Dasm,
    KickAss,
    Mads,
    Merlin32,
    Tass,
    Xasm,
    MadPascal,
}

impl Dialect {
    pub const ALL: [Dialect; 10] = [
        Dialect::Acme,
        Dialect::Asm6,
        Dialect::Atasm,
        Dialect::Dasm,
        Dialect::KickAss,
        Dialect::Mads,
        Dialect::Merlin32,
        Dialect::Tass,
        Dialect::Xasm,
        Dialect::MadPascal,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Dialect::Acme => "acme",
            Dialect::Asm6 => "asm6",
            Dialect::Atasm => "atasm",
            Dialect::Dasm => "dasm",
            Dialect::KickAss => "kickass",
            Dialect::Mads => "mads",
            Dialect::Merlin32 => "merlin32",
            Dialect::Tass => "tass",
            Dialect::Xasm => "xasm",
            Dialect::MadPascal => "madpascal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Dialect::Acme => "ACME",
            Dialect::Asm6 => "ASM6",
            Dialect::Atasm => "ATasm",
            Dialect::Dasm => "DASM",
            Dialect::KickAss => "Kick Assembler",
            Dialect::Mads => "MADS",
            Dialect::Merlin32 => "Merlin 32",
            Dialect::Tass => "64tass",
            Dialect::Xasm => "xasm",
            Dialect::MadPascal => "Mad Pascal",
        }
    }

    /// Resolve a dialect identifier, failing before any parsing starts.
    pub fn from_id(id: &str) -> Result<Self, IndexError> {
        let normalized = id.trim().to_ascii_lowercase();
        let dialect = match normalized.as_str() {
            "mp" => Some(Dialect::MadPascal),
            "64tass" => Some(Dialect::Tass),
            "kick" => Some(Dialect::KickAss),
            other => Self::ALL.into_iter().find(|dialect| dialect.id() == other),
        };
        dialect.ok_or_else(|| IndexError::UnsupportedDialect(id.to_string()))
    }

    /// Guess the dialect from a source file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pas" | "inc" => Some(Dialect::MadPascal),
            "s" => Some(Dialect::Merlin32),
            "a" | "b" => Some(Dialect::Acme),
            "asx" => Some(Dialect::Xasm),
            "asm" | "a65" => Some(Dialect::Mads),
            _ => None,
        }
    }

    pub fn syntax(self) -> &'static DialectSyntax {
        syntax::syntax_for(self)
    }

    pub fn is_pascal(self) -> bool {
        self == Dialect::MadPascal
    }
}

impl FromStr for Dialect {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
