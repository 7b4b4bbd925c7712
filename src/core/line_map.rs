// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line splitting and offset mapping for a source document.
//!
//! All offsets are byte offsets into the document text. Line numbers are
//! 1-based, columns are 0-based byte distances from the line start.

use serde::Serialize;

/// One physical source line without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: u32,
    pub text: String,
    pub start_offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    lines: Vec<SourceLine>,
    text_len: usize,
}

impl LineMap {
    /// Split `text` at `\n`, `\r\n` and lone `\r`.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0usize;
        let mut idx = 0usize;
        while idx < bytes.len() {
            match bytes[idx] {
                b'\n' => {
                    push_line(&mut lines, text, start, idx);
                    idx += 1;
                    start = idx;
                }
                b'\r' => {
                    push_line(&mut lines, text, start, idx);
                    idx += if bytes.get(idx + 1) == Some(&b'\n') { 2 } else { 1 };
                    start = idx;
                }
                _ => idx += 1,
            }
        }
        if start < bytes.len() {
            push_line(&mut lines, text, start, bytes.len());
        }
        Self {
            lines,
            text_len: text.len(),
        }
    }

    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, number: u32) -> Option<&SourceLine> {
        if number == 0 {
            return None;
        }
        self.lines.get(number as usize - 1)
    }

    /// Map an absolute offset to `(line, column)`.
    ///
    /// Offsets inside a line terminator belong to the line they terminate.
    /// Offsets past the end of the text map to the last line.
    pub fn position_of(&self, offset: usize) -> Option<(u32, usize)> {
        if self.lines.is_empty() || offset > self.text_len {
            return None;
        }
        let idx = match self
            .lines
            .binary_search_by(|line| line.start_offset.cmp(&offset))
        {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };
        let line = &self.lines[idx];
        let column = (offset - line.start_offset).min(line.text.len());
        Some((line.number, column))
    }

    /// Map a 1-based line and 0-based column to an absolute offset, clamped
    /// to the end of the line.
    pub fn offset_of(&self, line: u32, column: usize) -> Option<usize> {
        let line = self.line(line)?;
        Some(line.start_offset + column.min(line.text.len()))
    }
}

fn push_line(lines: &mut Vec<SourceLine>, text: &str, start: usize, end: usize) {
    lines.push(SourceLine {
        number: (lines.len() + 1) as u32,
        text: text[start..end].to_string(),
        start_offset: start,
    });
}
