// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Mapping compiler diagnostics onto document offsets.

use std::path::Path;

use serde::Serialize;

use crate::compiler_log::Diagnostic;
use crate::core::line_map::LineMap;
use crate::core::severity::Severity;

/// A diagnostic anchored at an absolute byte range of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub severity: Severity,
    /// 1-based, or 0 for a file-level marker.
    pub line: u32,
    pub start_offset: usize,
    pub end_offset: usize,
    pub message: String,
}

/// Whether a path printed by a compiler names `source`.
///
/// Compilers print paths relative to their working directory, so a
/// component-wise suffix match in either direction counts.
pub fn same_file(reported: &str, source: &Path) -> bool {
    let normalized = reported.replace('\\', "/");
    let reported = Path::new(normalized.trim());
    if reported.as_os_str().is_empty() {
        return false;
    }
    reported == source || source.ends_with(reported) || reported.ends_with(source)
}

/// Resolve the diagnostics reported for `file` against its line map.
///
/// A missing column marks the whole line; a missing line gives a file-level
/// marker at offset 0. Lines past the end of the document clamp to the last
/// line.
pub fn resolve_markers<'a, I>(diagnostics: I, lines: &LineMap, file: &Path) -> Vec<Marker>
where
    I: IntoIterator<Item = &'a Diagnostic>,
{
    diagnostics
        .into_iter()
        .filter(|diagnostic| {
            diagnostic
                .file_path
                .as_deref()
                .is_some_and(|path| same_file(path, file))
        })
        .map(|diagnostic| resolve_one(diagnostic, lines))
        .collect()
}

fn resolve_one(diagnostic: &Diagnostic, lines: &LineMap) -> Marker {
    let file_level = Marker {
        severity: diagnostic.severity,
        line: 0,
        start_offset: 0,
        end_offset: 0,
        message: diagnostic.message.clone(),
    };
    let Some(number) = diagnostic.line.filter(|&line| line > 0) else {
        return file_level;
    };
    let number = number.min(lines.len() as u32);
    let Some(source_line) = lines.line(number) else {
        return file_level;
    };

    let (start, end) = match diagnostic.column.filter(|&column| column > 0) {
        Some(column) => {
            let local = source_line
                .text
                .char_indices()
                .nth(column as usize - 1)
                .map_or(source_line.text.len(), |(idx, _)| idx);
            let token_end = source_line.text[local..]
                .find(char::is_whitespace)
                .map_or(source_line.text.len(), |len| local + len);
            (local, token_end)
        }
        None => (0, source_line.text.len()),
    };
    Marker {
        severity: diagnostic.severity,
        line: number,
        start_offset: source_line.start_offset + start,
        end_offset: source_line.start_offset + end,
        message: diagnostic.message.clone(),
    }
}
