// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Mad Pascal classification.
//!
//! Pascal is free-form, so the column-based fields of a tokenized line are
//! not used; the classifier scans the masked `code` text word by word and
//! tracks declaration sections and `begin`/`end` nesting.

use crate::core::tokenizer::TokenizedLine;
use crate::index::definition::{ClassificationEvent, Definition, DefinitionKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DeclSection {
    #[default]
    None,
    Const,
    Type,
    Var,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Body,
    Asm,
    Plain,
    Structure { announced: bool },
}

#[derive(Debug, Clone, Default)]
pub struct PascalState {
    section: DeclSection,
    blocks: Vec<Block>,
    /// Block depth each open procedure returns to when its body ends.
    procedures: Vec<usize>,
    in_interface: bool,
    pending_structure: bool,
}

impl PascalState {
    fn top(&self) -> Option<Block> {
        self.blocks.last().copied()
    }

    fn in_structure(&self) -> bool {
        matches!(self.top(), Some(Block::Structure { .. }))
    }

    fn in_code(&self) -> bool {
        matches!(self.top(), Some(Block::Body | Block::Asm | Block::Plain))
    }
}

#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
}

impl Word<'_> {
    fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }

    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

const PROCEDURE_KEYWORDS: &[&str] = &["procedure", "function", "constructor", "destructor"];

const RESERVED: &[&str] = &[
    "const", "type", "var", "label", "uses", "begin", "end", "asm", "case", "try", "record",
    "object", "procedure", "function", "constructor", "destructor", "interface",
    "implementation", "program", "unit", "library", "initialization", "finalization",
];

pub(super) fn classify(
    state: &mut PascalState,
    line_number: u32,
    line: &TokenizedLine,
) -> Vec<ClassificationEvent> {
    let mut events = Vec::new();
    if let Some(def) = compiler_directive(line_number, line) {
        events.push(ClassificationEvent::Define(def));
    }
    if line.is_blank() {
        return events;
    }

    let code = line.code.as_str();
    let words = pascal_words(code);
    let mut first = 0;
    let mut decl_from = 0;
    if let Some(section) = words.first().and_then(|word| section_keyword(word)) {
        state.section = section;
        first = 1;
        decl_from = words[0].end();
    }

    let starts_with_keyword = words
        .get(first)
        .map_or(true, |word| RESERVED.iter().any(|kw| word.is(kw)));
    if !starts_with_keyword && !state.in_code() && !state.in_structure() {
        declaration(state, line_number, line, decl_from, &mut events);
    }

    let mut idx = first;
    while idx < words.len() {
        let word = words[idx];
        idx += 1;

        if state.top() == Some(Block::Asm) {
            if word.is("end") {
                end_block(state, line_number, line, word, &mut events);
            }
            continue;
        }

        if PROCEDURE_KEYWORDS.iter().any(|kw| word.is(kw)) {
            if !is_procedural_type(state, code, word, idx - 1 > first) {
                procedure_header(state, line_number, line, &words[idx..], &mut events);
            }
            // Everything after the keyword is a signature or a type.
            idx = words.len();
            continue;
        }

        match word.text.to_ascii_lowercase().as_str() {
            "begin" => {
                state.section = DeclSection::None;
                state.blocks.push(Block::Body);
            }
            "asm" => {
                state.section = DeclSection::None;
                state.blocks.push(Block::Asm);
            }
            "try" => state.blocks.push(Block::Plain),
            "case" if !state.in_structure() => state.blocks.push(Block::Plain),
            "record" | "object" => {
                let announced = std::mem::take(&mut state.pending_structure);
                state.blocks.push(Block::Structure { announced });
            }
            "end" => end_block(state, line_number, line, word, &mut events),
            "interface" => {
                state.in_interface = true;
                state.section = DeclSection::None;
            }
            "implementation" => {
                state.in_interface = false;
                state.section = DeclSection::None;
            }
            _ => {
                if let Some(section) = section_keyword(&word) {
                    state.section = section;
                }
            }
        }
    }
    events
}

fn section_keyword(word: &Word<'_>) -> Option<DeclSection> {
    match word.text.to_ascii_lowercase().as_str() {
        "const" => Some(DeclSection::Const),
        "type" => Some(DeclSection::Type),
        "var" => Some(DeclSection::Var),
        "label" | "uses" => Some(DeclSection::Other),
        _ => None,
    }
}

/// `procedure` or `function` naming a type, as in `T = function: byte;`
/// or `f: procedure of object;`, rather than starting a header.
fn is_procedural_type(
    state: &PascalState,
    code: &str,
    keyword: Word<'_>,
    mid_statement: bool,
) -> bool {
    let before = code[..keyword.start].trim_end();
    if before.ends_with('=') || before.ends_with(':') {
        return true;
    }
    mid_statement && matches!(state.section, DeclSection::Type | DeclSection::Var)
}

fn end_block(
    state: &mut PascalState,
    line_number: u32,
    line: &TokenizedLine,
    word: Word<'_>,
    events: &mut Vec<ClassificationEvent>,
) {
    let Some(block) = state.blocks.pop() else {
        return;
    };
    let offset = line.code_offset + word.start;
    match block {
        Block::Structure { announced: true } => {
            events.push(ClassificationEvent::CloseSection {
                kind: DefinitionKind::StructureSection,
                line: line_number,
                offset,
            });
        }
        Block::Body | Block::Asm if state.procedures.last() == Some(&state.blocks.len()) => {
            state.procedures.pop();
            events.push(ClassificationEvent::CloseSection {
                kind: DefinitionKind::Procedure,
                line: line_number,
                offset,
            });
        }
        _ => {}
    }
}

fn procedure_header(
    state: &mut PascalState,
    line_number: u32,
    line: &TokenizedLine,
    rest: &[Word<'_>],
    events: &mut Vec<ClassificationEvent>,
) {
    let Some(name) = rest.first() else {
        return;
    };
    let leaf = state.in_interface
        || state.in_structure()
        || rest
            .iter()
            .any(|word| word.is("forward") || word.is("external"));
    let def = Definition::new(
        DefinitionKind::Procedure,
        name.text,
        line.code_offset + name.start,
        line_number,
    )
    .with_comment(&line.comment);

    if leaf {
        events.push(ClassificationEvent::Define(def));
        return;
    }
    state.section = DeclSection::None;
    state.procedures.push(state.blocks.len());
    events.push(ClassificationEvent::OpenSection(def));
}

fn declaration(
    state: &mut PascalState,
    line_number: u32,
    line: &TokenizedLine,
    from: usize,
    events: &mut Vec<ClassificationEvent>,
) {
    let text = &line.code[from..];
    let base = line.code_offset + from;
    match state.section {
        DeclSection::Const => {
            let Some((name, pos)) = leading_word(text) else {
                return;
            };
            let Some(eq) = text.find('=') else {
                return;
            };
            let value = text[eq + 1..].trim().trim_end_matches(';').trim_end();
            events.push(ClassificationEvent::Define(
                Definition::new(DefinitionKind::Equate, name, base + pos, line_number)
                    .with_value(value)
                    .with_comment(&line.comment),
            ));
        }
        DeclSection::Type => {
            let Some((name, pos)) = leading_word(text) else {
                return;
            };
            let Some(eq) = text.find('=') else {
                return;
            };
            let body = text[eq + 1..].trim_start();
            let lower = body.to_ascii_lowercase();
            let offset = base + pos;
            if body.starts_with('(') {
                events.push(ClassificationEvent::Define(
                    Definition::new(DefinitionKind::EnumSection, name, offset, line_number)
                        .with_comment(&line.comment),
                ));
            } else if lower.starts_with("record")
                || lower.starts_with("object")
                || lower.starts_with("packed record")
            {
                state.pending_structure = true;
                events.push(ClassificationEvent::OpenSection(
                    Definition::new(DefinitionKind::StructureSection, name, offset, line_number)
                        .with_comment(&line.comment),
                ));
            } else {
                let value = body.trim_end_matches(';').trim_end();
                events.push(ClassificationEvent::Define(
                    Definition::new(DefinitionKind::Equate, name, offset, line_number)
                        .with_value(value)
                        .with_comment(&line.comment),
                ));
            }
        }
        DeclSection::Var => {
            let names = text.split(':').next().unwrap_or_default();
            if !text.contains(':') {
                return;
            }
            let mut cursor = 0;
            for part in names.split(',') {
                if let Some((name, pos)) = leading_word(part) {
                    events.push(ClassificationEvent::Define(
                        Definition::new(
                            DefinitionKind::Label,
                            name,
                            base + cursor + pos,
                            line_number,
                        )
                        .with_comment(&line.comment),
                    ));
                }
                cursor += part.len() + 1;
            }
        }
        DeclSection::None | DeclSection::Other => {}
    }
}

/// `{$I file}`, `{$INCLUDE file}` and `{$R file}` directives in the comment.
fn compiler_directive(line_number: u32, line: &TokenizedLine) -> Option<Definition> {
    let body = line.comment.strip_prefix('$')?;
    let (directive, argument) = match body.find(|c: char| c.is_whitespace()) {
        Some(pos) => (&body[..pos], body[pos..].trim()),
        None => return None,
    };
    let kind = match directive.to_ascii_lowercase().as_str() {
        "i" | "include" => DefinitionKind::SourceInclude,
        "r" | "resource" => DefinitionKind::BinaryInclude,
        _ => return None,
    };
    let path = argument.trim_matches('\'').trim_matches('"');
    if path.is_empty() {
        return None;
    }
    // Skip past "$", the directive, the blanks and an opening quote.
    let mut arg_start = line.comment.len() - line.comment[1 + directive.len()..].trim_start().len();
    if line.comment[arg_start..].starts_with(['\'', '"']) {
        arg_start += 1;
    }
    Some(
        Definition::new(kind, path, line.comment_offset + arg_start, line_number).with_value(path),
    )
}

fn leading_word(text: &str) -> Option<(&str, usize)> {
    pascal_words(text)
        .first()
        .filter(|word| word.start == text.len() - text.trim_start().len())
        .map(|word| (word.text, word.start))
}

/// Identifier words outside strings, numbers and parentheses.
fn pascal_words(code: &str) -> Vec<Word<'_>> {
    let bytes = code.as_bytes();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut idx = 0;
    while idx < bytes.len() {
        let c = bytes[idx];
        match c {
            b'\'' => {
                idx += 1;
                while idx < bytes.len() && bytes[idx] != b'\'' {
                    idx += 1;
                }
                idx += 1;
            }
            b'(' => {
                depth += 1;
                idx += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                idx += 1;
            }
            b'$' | b'#' | b'%' | b'0'..=b'9' => {
                idx += 1;
                while idx < bytes.len() && bytes[idx].is_ascii_alphanumeric() {
                    idx += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = idx;
                while idx < bytes.len() {
                    let next = bytes[idx];
                    let qualified = next == b'.'
                        && bytes
                            .get(idx + 1)
                            .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');
                    if next.is_ascii_alphanumeric() || next == b'_' || qualified {
                        idx += 1;
                    } else {
                        break;
                    }
                }
                if depth == 0 {
                    words.push(Word {
                        text: &code[start..idx],
                        start,
                    });
                }
            }
            _ => idx += 1,
        }
    }
    words
}
