// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Dialect-agnostic line tokenizer.
//!
//! Splits one physical line into symbol, instruction, operand and comment
//! fields. Tokenization never fails: text that does not fit the expected
//! shape simply leaves fields empty. Offsets in [`TokenizedLine`] are
//! absolute byte offsets into the document.

use serde::Serialize;

use crate::core::text_utils::is_space;

/// Comment conventions supplied by a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Markers that start a comment running to end of line, anywhere.
    pub line_markers: &'static [&'static str],
    /// Markers that make the whole line a comment when found in column 0.
    pub column_zero_markers: &'static [&'static str],
    /// Block comment delimiters, which may span lines.
    pub block_delimiters: &'static [(&'static str, &'static str)],
    /// Whether `'...'` hides comment markers like `"..."` does.
    pub single_quote_strings: bool,
}

impl CommentSyntax {
    pub const SEMICOLON: CommentSyntax = CommentSyntax {
        line_markers: &[";"],
        column_zero_markers: &[],
        block_delimiters: &[],
        single_quote_strings: false,
    };
}

/// Block comment state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentState {
    open_block_close: Option<&'static str>,
}

impl CommentState {
    pub fn in_block_comment(&self) -> bool {
        self.open_block_close.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizedLine {
    pub line_start_offset: usize,
    pub symbol: String,
    pub symbol_offset: usize,
    pub instruction: String,
    pub instruction_offset: usize,
    pub operand: String,
    pub operand_offset: usize,
    pub comment: String,
    pub comment_offset: usize,
    /// Code part of the line with comments blanked out and edges trimmed.
    pub code: String,
    pub code_offset: usize,
}

impl TokenizedLine {
    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }
}

/// Tokenize a single line with no block comment carried in.
pub fn tokenize(line: &str, line_start_offset: usize, syntax: &CommentSyntax) -> TokenizedLine {
    let mut state = CommentState::default();
    tokenize_line(line, line_start_offset, syntax, &mut state)
}

/// Tokenize a line, updating the block comment state for the next line.
pub fn tokenize_line(
    line: &str,
    line_start_offset: usize,
    syntax: &CommentSyntax,
    state: &mut CommentState,
) -> TokenizedLine {
    let (masked, comment) = mask_comments(line, syntax, state);
    let mut out = TokenizedLine {
        line_start_offset,
        symbol_offset: line_start_offset,
        instruction_offset: line_start_offset,
        operand_offset: line_start_offset,
        comment_offset: line_start_offset + line.len(),
        code_offset: line_start_offset,
        ..TokenizedLine::default()
    };

    if let Some((start, end)) = comment {
        let text = &line[start..end];
        let lead = text.len() - text.trim_start().len();
        out.comment = text.trim().to_string();
        out.comment_offset = line_start_offset + start + lead;
    }

    let code = masked.trim_end_matches([' ', '\t']);
    let code_start = code.len() - code.trim_start_matches([' ', '\t']).len();
    out.code = code[code_start..].to_string();
    out.code_offset = line_start_offset + code_start;

    let bytes = code.as_bytes();
    let mut idx = 0usize;
    if !bytes.is_empty() && !is_space(bytes[0]) {
        while idx < bytes.len() && !is_symbol_terminator(bytes[idx], idx) {
            idx += 1;
        }
        out.symbol = code[..idx].to_string();
        let mut colons = 0;
        while colons < 2
            && idx < bytes.len()
            && bytes[idx] == b':'
            && !starts_with_at(bytes, idx, b":=")
        {
            idx += 1;
            colons += 1;
        }
    }

    idx = skip_blanks(bytes, idx);
    out.instruction_offset = line_start_offset + idx;
    let instruction_end = if starts_with_at(bytes, idx, b":=") {
        idx + 2
    } else if starts_with_at(bytes, idx, b"=") {
        idx + 1
    } else {
        let mut end = idx;
        while end < bytes.len() && !is_space(bytes[end]) && bytes[end] != b'=' {
            end += 1;
        }
        end
    };
    out.instruction = code[idx..instruction_end].to_string();

    let operand_start = skip_blanks(bytes, instruction_end);
    out.operand_offset = line_start_offset + operand_start;
    out.operand = code[operand_start..].to_string();
    out
}

// A leading ':' belongs to the symbol (Merlin local labels like `:loop`).
fn is_symbol_terminator(c: u8, idx: usize) -> bool {
    is_space(c) || c == b'=' || (c == b':' && idx > 0)
}

fn skip_blanks(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && is_space(bytes[idx]) {
        idx += 1;
    }
    idx
}

fn starts_with_at(bytes: &[u8], idx: usize, needle: &[u8]) -> bool {
    bytes.get(idx..).is_some_and(|rest| rest.starts_with(needle))
}

/// Blank out every comment byte, returning the masked line and the byte
/// range of the first comment's text (marker excluded).
///
/// Masking keeps byte offsets stable, so code fields can be sliced from the
/// masked text at the same positions as in the original line. Comment
/// delimiters are ASCII, which keeps every cut on a char boundary.
fn mask_comments(
    line: &str,
    syntax: &CommentSyntax,
    state: &mut CommentState,
) -> (String, Option<(usize, usize)>) {
    let bytes = line.as_bytes();
    let mut masked = bytes.to_vec();
    let mut first_comment: Option<(usize, usize)> = None;
    let mut idx = 0usize;

    if let Some(close) = state.open_block_close {
        match find_from(bytes, 0, close.as_bytes()) {
            Some(pos) => {
                blank(&mut masked, 0, pos + close.len());
                first_comment = Some((0, pos));
                state.open_block_close = None;
                idx = pos + close.len();
            }
            None => {
                blank(&mut masked, 0, bytes.len());
                return (into_string(masked), Some((0, bytes.len())));
            }
        }
    } else if let Some(marker) = syntax
        .column_zero_markers
        .iter()
        .find(|marker| bytes.starts_with(marker.as_bytes()))
    {
        blank(&mut masked, 0, bytes.len());
        return (into_string(masked), Some((marker.len(), bytes.len())));
    }

    while idx < bytes.len() {
        let c = bytes[idx];
        let quoted = c == b'"' || (c == b'\'' && syntax.single_quote_strings);
        if quoted && bytes[idx + 1..].contains(&c) {
            idx = skip_string(bytes, idx);
            continue;
        }

        if let Some((open, close)) = syntax
            .block_delimiters
            .iter()
            .find(|(open, _)| starts_with_at(bytes, idx, open.as_bytes()))
        {
            let body_start = idx + open.len();
            match find_from(bytes, body_start, close.as_bytes()) {
                Some(pos) => {
                    blank(&mut masked, idx, pos + close.len());
                    first_comment.get_or_insert((body_start, pos));
                    idx = pos + close.len();
                    continue;
                }
                None => {
                    blank(&mut masked, idx, bytes.len());
                    first_comment.get_or_insert((body_start, bytes.len()));
                    state.open_block_close = Some(close);
                    break;
                }
            }
        }

        if let Some(marker) = syntax
            .line_markers
            .iter()
            .find(|marker| starts_with_at(bytes, idx, marker.as_bytes()))
        {
            blank(&mut masked, idx, bytes.len());
            first_comment.get_or_insert((idx + marker.len(), bytes.len()));
            break;
        }
        idx += 1;
    }

    (into_string(masked), first_comment)
}

/// Skip a quoted string starting at `idx`; the closing quote is known to
/// exist on the line. Returns the index after the closing quote.
fn skip_string(bytes: &[u8], idx: usize) -> usize {
    let quote = bytes[idx];
    let mut pos = idx + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if quote == b'"' && bytes[pos + 1..].contains(&quote) => pos += 2,
            c if c == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// `code` with every string literal blanked, quotes included.
///
/// Same string rules as comment masking: `"..."` always, `'...'` only when
/// the dialect declares it, and an unterminated quote is not a string.
pub fn blank_strings(code: &str, syntax: &CommentSyntax) -> String {
    let bytes = code.as_bytes();
    let mut masked = bytes.to_vec();
    let mut idx = 0usize;
    while idx < bytes.len() {
        let c = bytes[idx];
        let quoted = c == b'"' || (c == b'\'' && syntax.single_quote_strings);
        if quoted && bytes[idx + 1..].contains(&c) {
            let end = skip_string(bytes, idx);
            blank(&mut masked, idx, end);
            idx = end;
        } else {
            idx += 1;
        }
    }
    into_string(masked)
}

fn blank(bytes: &mut [u8], start: usize, end: usize) {
    for byte in &mut bytes[start..end] {
        *byte = b' ';
    }
}

fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
