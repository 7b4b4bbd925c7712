// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use std::iter::Peekable;
use std::str::Lines;

use log::trace;
use serde::Serialize;

use crate::core::severity::Severity;
use crate::dialect::Dialect;

use super::patterns::{format_for, match_line, LineFields, LogFormat};

/// One problem reported by an external compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file_path: Option<String>,
    /// 1-based.
    pub line: Option<u32>,
    /// 1-based.
    pub column: Option<u32>,
    pub message: String,
    /// 1-based log line the diagnostic starts at.
    pub log_line: u32,
    /// Number of log lines the diagnostic accounts for.
    pub log_line_count: u32,
}

impl Diagnostic {
    fn from_fields(fields: LineFields<'_>, log_line: u32) -> Self {
        Self {
            severity: Severity::from_token(fields.severity),
            file_path: fields.file.map(str::to_string),
            line: fields.line,
            column: fields.column,
            message: fields.message.unwrap_or_default().to_string(),
            log_line,
            log_line_count: 1,
        }
    }

    fn preamble(text: &str, log_line: u32) -> Self {
        Self {
            severity: Severity::Info,
            file_path: None,
            line: None,
            column: None,
            message: text.to_string(),
            log_line,
            log_line_count: 1,
        }
    }

    /// Fill fields the header line left open from a completion line.
    fn complete(&mut self, fields: LineFields<'_>) {
        if let Some(severity) = fields.severity {
            self.severity = Severity::from_token(Some(severity));
        }
        if self.file_path.is_none() {
            self.file_path = fields.file.map(str::to_string);
        }
        self.line = self.line.or(fields.line);
        self.column = self.column.or(fields.column);
        if let Some(message) = fields.message {
            if self.message.is_empty() {
                self.message = message.to_string();
            } else {
                self.append(message);
            }
        }
    }

    fn append(&mut self, text: &str) {
        self.message.push('\n');
        self.message.push_str(text);
    }

    pub fn has_position(&self) -> bool {
        self.file_path.is_some() && self.line.is_some()
    }
}

/// Lazy iterator over the diagnostics of one log.
///
/// Cloning restarts from the clone point; the whole log is always consumed.
#[derive(Debug, Clone)]
pub struct LogDiagnostics<'a> {
    lines: Peekable<Lines<'a>>,
    format: LogFormat,
    next_line: u32,
}

impl<'a> LogDiagnostics<'a> {
    fn take_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.next_line += 1;
        Some(line)
    }

    fn is_header(&self, line: &str) -> bool {
        self.format.header.is_match(line)
    }
}

impl Iterator for LogDiagnostics<'_> {
    type Item = Diagnostic;

    fn next(&mut self) -> Option<Diagnostic> {
        let log_line = self.next_line + 1;
        let first = self.take_line()?;
        let (mut diagnostic, mut expect_completion) = match match_line(self.format.header, first) {
            Some(fields) => (
                Diagnostic::from_fields(fields, log_line),
                self.format.completion.is_some(),
            ),
            None => (Diagnostic::preamble(first, log_line), false),
        };

        while let Some(&line) = self.lines.peek() {
            if self.is_header(line) {
                break;
            }
            let completion = self
                .format
                .completion
                .filter(|_| expect_completion)
                .and_then(|regex| match_line(regex, line));
            match completion {
                Some(fields) => diagnostic.complete(fields),
                None => diagnostic.append(line),
            }
            expect_completion = false;
            self.take_line();
            diagnostic.log_line_count += 1;
        }

        trace!(
            "log lines {}..{}: {} diagnostic",
            diagnostic.log_line,
            diagnostic.log_line + diagnostic.log_line_count,
            diagnostic.severity
        );
        Some(diagnostic)
    }
}

/// Parse compiler output with the recognizer of `dialect`.
pub fn parse_log(log_text: &str, dialect: Dialect) -> LogDiagnostics<'_> {
    LogDiagnostics {
        lines: log_text.lines().peekable(),
        format: format_for(dialect),
        next_line: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn continuation_lines_join_the_previous_diagnostic() {
        let log = "error: file.asm(12): undefined symbol FOO\n  additional context\n";
        let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::Asm6).collect();
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.file_path.as_deref(), Some("file.asm"));
        assert_eq!(diagnostic.line, Some(12));
        assert_eq!(diagnostic.column, None);
        assert_eq!(diagnostic.message, "undefined symbol FOO\n  additional context");
        assert_eq!(diagnostic.log_line_count, 2);
    }

    #[test]
    fn preamble_lines_become_info() {
        let log = "pass 1..\npass 2..\nmain.asm(3): Branch out of range\nwarning: main.asm(9): unused";
        let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::Asm6).collect();
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].severity, Severity::Info);
        assert_eq!(diagnostics[0].message, "pass 1..\npass 2..");
        assert!(!diagnostics[0].has_position());
        assert_eq!(diagnostics[1].severity, Severity::Error);
        assert_eq!(diagnostics[2].severity, Severity::Warning);
        assert_eq!(diagnostics[2].log_line, 4);
    }

    #[test]
    fn kickass_location_completes_message_line() {
        let log = "Error: Unknown symbol 'screen'\nat line 14, column 9 in main.asm\n\n  lda screen\nWarning: unused label\nat line 20, column 1 in lib.asm";
        let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::KickAss).collect();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].file_path.as_deref(), Some("main.asm"));
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (Some(14), Some(9)));
        assert_eq!(diagnostics[0].message, "Unknown symbol 'screen'\n\n  lda screen");
        assert_eq!(diagnostics[0].log_line_count, 4);
        assert_eq!(diagnostics[1].severity, Severity::Warning);
        assert_eq!(diagnostics[1].line, Some(20));
    }

    #[test]
    fn atasm_message_follows_location() {
        let log = "In game.m65, line 12--\n Warning: Short jump\nIn game.m65, line 30--\nError: Unknown symbol";
        let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::Atasm).collect();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "Short jump");
        assert_eq!(diagnostics[0].line, Some(12));
        assert_eq!(diagnostics[1].severity, Severity::Error);
        assert_eq!(diagnostics[1].file_path.as_deref(), Some("game.m65"));
    }

    #[test]
    fn unknown_severity_is_error_and_iterator_restarts() {
        let log = "demo.pas (3,1) Fatal: Can't open include file\ndemo.pas (4) Note: Local variable not used";
        let diagnostics = parse_log(log, Dialect::MadPascal);
        let restarted = diagnostics.clone();
        let severities: Vec<Severity> = diagnostics.map(|d| d.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Info]);
        assert_eq!(restarted.count(), 2);
    }

    proptest! {
        #[test]
        fn every_log_line_is_accounted_for(
            lines in proptest::collection::vec(
                prop_oneof![
                    "[a-z]{1,6}\\.asm\\([0-9]{1,3}\\): [a-z ]{0,12}",
                    "(warning|error): [a-z]{1,6}\\.asm\\([0-9]{1,3}\\): [a-z ]{0,12}",
                    "[ a-z]{0,16}",
                ],
                0..12,
            )
        ) {
            let log = lines.join("\n");
            let diagnostics: Vec<Diagnostic> = parse_log(&log, Dialect::Asm6).collect();
            let mut expected_line = 1;
            for diagnostic in &diagnostics {
                prop_assert_eq!(diagnostic.log_line, expected_line);
                prop_assert!(diagnostic.log_line_count >= 1);
                expected_line += diagnostic.log_line_count;
            }
            prop_assert_eq!(expected_line as usize - 1, log.lines().count());
        }
    }
}
