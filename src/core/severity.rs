// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use std::fmt;

use serde::Serialize;

/// Severity taxonomy shared by compiler diagnostics and property checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Map a tool's severity keyword to the taxonomy.
    ///
    /// Unknown or missing keywords map to [`Severity::Error`] so that a
    /// reported problem is never downgraded.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Severity::Error;
        };
        match token.trim().to_ascii_lowercase().as_str() {
            "warning" | "warn" => Severity::Warning,
            "info" | "information" | "note" | "hint" => Severity::Info,
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
