// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Shared text utilities for tokenization and classification.

/// Check if a byte is whitespace inside a line (space or tab).
#[inline]
pub fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Check if a byte is a valid identifier start character.
#[inline]
pub fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'@' || c == b'.' || c == b'?' || c == b']'
}

/// Check if a byte is a valid identifier continuation character.
#[inline]
pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b'@' || c == b'?'
}

/// Skip spaces and tabs starting at `idx`.
pub fn skip_spaces_tabs(input: &str, mut idx: usize) -> usize {
    let bytes = input.as_bytes();
    while idx < bytes.len() && is_space(bytes[idx]) {
        idx += 1;
    }
    idx
}

/// Take the identifier starting at `start`, returning it with its end index.
pub fn take_ident_at(input: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    let first = *bytes.get(start)?;
    if !is_ident_start(first) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && is_ident_char(bytes[idx]) {
        idx += 1;
    }
    Some((&input[start..idx], idx))
}

/// First identifier of `input` after leading blanks, with its byte offset.
pub fn leading_ident(input: &str) -> Option<(&str, usize)> {
    let start = skip_spaces_tabs(input, 0);
    take_ident_at(input, start).map(|(ident, _)| (ident, start))
}

/// Truncate `input` to `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (count, ch) in input.chars().enumerate() {
        if count >= max_chars {
            out.push_str("...");
            return out;
        }
        out.push(ch);
    }
    out
}
