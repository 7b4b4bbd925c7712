// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-dialect recognizers for compiler log lines.
//!
//! Every pattern uses the named groups `sev`, `file`, `line`, `col` and
//! `msg`; a recognizer only captures the groups its tool prints.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dialect::Dialect;

static ASM6: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?i:(?P<sev>error|warning|fatal|info|note|hint)):\s*)?(?P<file>[^()]+?)\((?P<line>\d+)\):\s*(?P<msg>.*)$",
    )
    .unwrap()
});

static ACME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sev>Serious error|Error|Warning|Info)\s+-\s+File\s+(?P<file>.+?),\s+line\s+(?P<line>\d+)(?:\s+\([^)]*\))?:\s*(?P<msg>.*)$",
    )
    .unwrap()
});

static ATASM_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^In (?P<file>.+?), line (?P<line>\d+)--\s*$").unwrap());

static ATASM_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<sev>Error|Warning):\s*(?P<msg>.*)$").unwrap());

static DASM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>[^()]+?)\s+\((?P<line>\d+)\):\s*(?:(?i:(?P<sev>error|warning|fatal|abort)):\s*)?(?P<msg>.*)$",
    )
    .unwrap()
});

static KICKASS_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<sev>Error|Warning):\s*(?P<msg>.*)$").unwrap());

static KICKASS_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at line (?P<line>\d+),\s*column (?P<col>\d+) in (?P<file>.+?)\s*$").unwrap()
});

/// MADS, xasm and Mad Pascal share one shape.
static FILE_PAREN_SEVERITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?)\s*\((?P<line>\d+)(?:,\s*(?P<col>\d+))?\)\s+(?P<sev>[A-Za-z][A-Za-z ]*?):\s*(?P<msg>.*)$",
    )
    .unwrap()
});

static MERLIN32: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sev>[A-Za-z][A-Za-z ]*?) in line (?P<line>\d+) of file '(?P<file>[^']*)'\s*:\s*(?P<msg>.*)$",
    )
    .unwrap()
});

static TASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+):\s*(?P<sev>[A-Za-z][A-Za-z ]*?):\s*(?P<msg>.*)$",
    )
    .unwrap()
});

/// How one tool reports diagnostics.
#[derive(Debug, Clone, Copy)]
pub(super) struct LogFormat {
    /// Matches the first line of a diagnostic.
    pub header: &'static LazyLock<Regex>,
    /// Matches a line directly after the header that completes it.
    pub completion: Option<&'static LazyLock<Regex>>,
}

pub(super) fn format_for(dialect: Dialect) -> LogFormat {
    let (header, completion): (&'static LazyLock<Regex>, Option<&'static LazyLock<Regex>>) =
        match dialect {
            Dialect::Asm6 => (&ASM6, None),
            Dialect::Acme => (&ACME, None),
            Dialect::Atasm => (&ATASM_LOCATION, Some(&ATASM_MESSAGE)),
            Dialect::Dasm => (&DASM, None),
            Dialect::KickAss => (&KICKASS_MESSAGE, Some(&KICKASS_LOCATION)),
            Dialect::Mads | Dialect::Xasm | Dialect::MadPascal => (&FILE_PAREN_SEVERITY, None),
            Dialect::Merlin32 => (&MERLIN32, None),
            Dialect::Tass => (&TASS, None),
        };
    LogFormat { header, completion }
}

/// Fields captured from one log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct LineFields<'a> {
    pub severity: Option<&'a str>,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: Option<&'a str>,
}

impl<'a> LineFields<'a> {
    pub fn from_captures(caps: &Captures<'a>) -> Self {
        let text = |name: &str| caps.name(name).map(|m| m.as_str());
        let number = |name: &str| text(name).and_then(|value| value.parse::<u32>().ok());
        Self {
            severity: text("sev"),
            file: text("file").map(str::trim),
            line: number("line"),
            column: number("col"),
            message: text("msg"),
        }
    }
}

pub(super) fn match_line<'a>(regex: &Regex, line: &'a str) -> Option<LineFields<'a>> {
    regex
        .captures(line)
        .map(|caps| LineFields::from_captures(&caps))
}
