// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-parse classification state machine.
//!
//! A [`Classifier`] is folded over the tokenized lines of one document and
//! turns each line into zero or more [`ClassificationEvent`]s. Macro and
//! repeat bodies are opaque: nothing inside them is classified until the
//! matching close token is seen.

use std::borrow::Cow;

use log::{trace, warn};

use crate::core::text_utils::leading_ident;
use crate::core::tokenizer::{blank_strings, TokenizedLine};
use crate::index::definition::{ClassificationEvent, Definition, DefinitionKind};

use super::pascal::{self, PascalState};
use super::syntax::DialectSyntax;
use super::Dialect;

/// Where the classifier is relative to opaque multi-line bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockState {
    #[default]
    Normal,
    InMacroBody { name: String, depth: usize },
    InRepeatBlock { depth: usize },
}

impl BlockState {
    /// Enter a body whose opening line changed the nesting by `opening_delta`.
    ///
    /// Token-delimited bodies start at depth one. Brace-delimited bodies start
    /// at the opening line's brace balance; a line such as `!macro m { nop }`
    /// is balanced and has no body at all.
    pub fn enter_macro(name: String, brace_blocks: bool, code: &str) -> BlockState {
        match opening_depth(brace_blocks, code) {
            Some(depth) => BlockState::InMacroBody { name, depth },
            None => BlockState::Normal,
        }
    }

    pub fn enter_repeat(brace_blocks: bool, code: &str) -> BlockState {
        match opening_depth(brace_blocks, code) {
            Some(depth) => BlockState::InRepeatBlock { depth },
            None => BlockState::Normal,
        }
    }

    /// Advance through one body line that changes the nesting by `delta`.
    pub fn advance(self, delta: isize) -> BlockState {
        match self {
            BlockState::Normal => BlockState::Normal,
            BlockState::InMacroBody { name, depth } => match next_depth(depth, delta) {
                Some(depth) => BlockState::InMacroBody { name, depth },
                None => BlockState::Normal,
            },
            BlockState::InRepeatBlock { depth } => match next_depth(depth, delta) {
                Some(depth) => BlockState::InRepeatBlock { depth },
                None => BlockState::Normal,
            },
        }
    }

    pub fn is_opaque(&self) -> bool {
        !matches!(self, BlockState::Normal)
    }
}

fn opening_depth(brace_blocks: bool, code: &str) -> Option<usize> {
    if !brace_blocks {
        return Some(1);
    }
    let balance = brace_balance(code);
    if balance <= 0 && code.contains('{') {
        None
    } else {
        Some(balance.max(0) as usize)
    }
}

fn next_depth(depth: usize, delta: isize) -> Option<usize> {
    let next = depth as isize + delta;
    if delta < 0 && next <= 0 {
        None
    } else {
        Some(next.max(0) as usize)
    }
}

fn brace_balance(code: &str) -> isize {
    code.bytes().fold(0isize, |acc, byte| match byte {
        b'{' => acc + 1,
        b'}' => acc - 1,
        _ => acc,
    })
}

pub struct Classifier {
    dialect: Dialect,
    syntax: &'static DialectSyntax,
    extra_equates: Vec<String>,
    state: BlockState,
    sections: Vec<DefinitionKind>,
    pascal: PascalState,
}

impl Classifier {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            syntax: dialect.syntax(),
            extra_equates: Vec::new(),
            state: BlockState::Normal,
            sections: Vec::new(),
            pascal: PascalState::default(),
        }
    }

    /// Treat additional instruction tokens as equate directives.
    pub fn with_extra_equates<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_equates
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Kinds of the sections currently open, innermost last.
    pub fn open_sections(&self) -> &[DefinitionKind] {
        &self.sections
    }

    pub fn classify(&mut self, line_number: u32, line: &TokenizedLine) -> Vec<ClassificationEvent> {
        let mut events = if self.dialect.is_pascal() {
            pascal::classify(&mut self.pascal, line_number, line)
        } else {
            self.classify_assembler(line_number, line)
        };
        for def in events.iter_mut().filter_map(ClassificationEvent::definition_mut) {
            def.column = def.offset.saturating_sub(line.line_start_offset);
        }
        events
    }

    fn classify_assembler(
        &mut self,
        line_number: u32,
        line: &TokenizedLine,
    ) -> Vec<ClassificationEvent> {
        if line.is_blank() {
            return Vec::new();
        }
        let line = shift_directive_symbol(self.syntax, line);
        if self.state.is_opaque() {
            self.advance_body(line_number, &line);
            return Vec::new();
        }

        let mut events = Vec::new();
        self.classify_statement(line_number, &line, &mut events);
        events
    }

    fn advance_body(&mut self, line_number: u32, line: &TokenizedLine) {
        let instruction = line.instruction.as_str();
        let delta = if self.syntax.brace_blocks {
            brace_balance(&blank_strings(&line.code, &self.syntax.comments))
        } else {
            match &self.state {
                BlockState::InMacroBody { .. } => {
                    token_delta(
                        self.syntax.is_macro_open(instruction),
                        self.syntax.is_macro_close(instruction),
                    )
                }
                BlockState::InRepeatBlock { .. } => token_delta(
                    self.syntax.is_repeat_open(instruction),
                    self.syntax.is_repeat_close(instruction),
                ),
                BlockState::Normal => 0,
            }
        };
        self.state = std::mem::take(&mut self.state).advance(delta);
        if !self.state.is_opaque() {
            trace!("line {line_number}: body closed by '{instruction}'");
        }
    }

    fn classify_statement(
        &mut self,
        line_number: u32,
        line: &TokenizedLine,
        events: &mut Vec<ClassificationEvent>,
    ) {
        let syntax = self.syntax;
        let instruction = line.instruction.as_str();
        let has_symbol = !line.symbol.is_empty();

        if syntax.is_macro_open(instruction) {
            let (name, offset) = block_name(line);
            if !name.is_empty() {
                events.push(ClassificationEvent::Define(
                    Definition::new(DefinitionKind::Macro, name.clone(), offset, line_number)
                        .with_comment(&line.comment),
                ));
            }
            let code = blank_strings(&line.code, &syntax.comments);
            self.state = BlockState::enter_macro(name, syntax.brace_blocks, &code);
            return;
        }

        if syntax.is_repeat_open(instruction) {
            if has_symbol {
                events.push(label(line_number, line));
            }
            let code = blank_strings(&line.code, &syntax.comments);
            self.state = BlockState::enter_repeat(syntax.brace_blocks, &code);
            return;
        }

        if let Some(section) = syntax.section_opened_by(instruction) {
            if section.implicit_close && self.sections.last() == Some(&section.kind) {
                self.sections.pop();
                events.push(ClassificationEvent::CloseSection {
                    kind: section.kind,
                    line: line_number,
                    offset: line.instruction_offset,
                });
            }
            let (name, offset) = block_name(line);
            events.push(ClassificationEvent::OpenSection(
                Definition::new(section.kind, name, offset, line_number)
                    .with_comment(&line.comment),
            ));
            self.sections.push(section.kind);
            return;
        }

        if let Some(section) = syntax.section_closed_by(instruction) {
            if has_symbol {
                events.push(label(line_number, line));
            }
            self.close_section(section.kind, line_number, line, events);
            return;
        }

        if has_symbol && self.is_equate(instruction) {
            events.push(ClassificationEvent::Define(
                Definition::new(
                    DefinitionKind::Equate,
                    line.symbol.clone(),
                    line.symbol_offset,
                    line_number,
                )
                .with_value(line.operand.clone())
                .with_comment(&line.comment),
            ));
            return;
        }

        if !has_symbol && syntax.is_operand_equate(instruction) {
            if let Some(def) = operand_equate(line_number, line) {
                events.push(ClassificationEvent::Define(def));
            }
            return;
        }

        if let Some(include) = syntax.include_for(instruction, &line.operand) {
            if has_symbol {
                events.push(label(line_number, line));
            }
            let path = include_path(&line.operand, include.qualifier.is_some());
            if !path.is_empty() {
                let offset = line.operand_offset + line.operand.find(path.as_str()).unwrap_or(0);
                events.push(ClassificationEvent::Define(
                    Definition::new(include.kind, path.clone(), offset, line_number)
                        .with_value(path)
                        .with_comment(&line.comment),
                ));
            }
            return;
        }

        if has_symbol {
            events.push(label(line_number, line));
        }
    }

    fn is_equate(&self, instruction: &str) -> bool {
        self.syntax.is_equate(instruction)
            || self
                .extra_equates
                .iter()
                .any(|token| token.eq_ignore_ascii_case(instruction))
    }

    fn close_section(
        &mut self,
        kind: DefinitionKind,
        line_number: u32,
        line: &TokenizedLine,
        events: &mut Vec<ClassificationEvent>,
    ) {
        let Some(position) = self.sections.iter().rposition(|open| *open == kind) else {
            warn!(
                "line {line_number}: '{}' closes no open {} section",
                line.instruction,
                kind.as_str()
            );
            return;
        };
        while self.sections.len() > position {
            if let Some(open) = self.sections.pop() {
                events.push(ClassificationEvent::CloseSection {
                    kind: open,
                    line: line_number,
                    offset: line.instruction_offset,
                });
            }
        }
    }
}

/// Directives written in column 0 (`!macro`, `.proc`, `ENDM`) land in the
/// symbol field; move them to the instruction field.
fn shift_directive_symbol<'a>(
    syntax: &DialectSyntax,
    line: &'a TokenizedLine,
) -> Cow<'a, TokenizedLine> {
    if line.symbol.is_empty() || !syntax.is_directive(&line.symbol) {
        return Cow::Borrowed(line);
    }
    let rest = line.code.get(line.symbol.len()..).unwrap_or_default();
    let operand = rest.trim_start();
    let mut shifted = line.clone();
    shifted.instruction = std::mem::take(&mut shifted.symbol);
    shifted.instruction_offset = line.symbol_offset;
    shifted.operand = operand.to_string();
    shifted.operand_offset = line.code_offset + line.symbol.len() + (rest.len() - operand.len());
    Cow::Owned(shifted)
}

fn token_delta(opens: bool, closes: bool) -> isize {
    match (opens, closes) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

fn label(line_number: u32, line: &TokenizedLine) -> ClassificationEvent {
    ClassificationEvent::Define(
        Definition::new(
            DefinitionKind::Label,
            line.symbol.clone(),
            line.symbol_offset,
            line_number,
        )
        .with_comment(&line.comment),
    )
}

/// Name of a macro or section: the symbol field when present, otherwise
/// the first identifier of the operand.
fn block_name(line: &TokenizedLine) -> (String, usize) {
    if !line.symbol.is_empty() {
        return (line.symbol.clone(), line.symbol_offset);
    }
    match leading_ident(&line.operand) {
        Some((name, pos)) => (name.to_string(), line.operand_offset + pos),
        None => (String::new(), line.instruction_offset),
    }
}

/// `.const NAME = value` or `.var NAME = value`.
fn operand_equate(line_number: u32, line: &TokenizedLine) -> Option<Definition> {
    let (name, pos) = leading_ident(&line.operand)?;
    let rest = line.operand[pos + name.len()..].trim_start();
    let value = rest.strip_prefix('=').unwrap_or(rest).trim();
    Some(
        Definition::new(
            DefinitionKind::Equate,
            name,
            line.operand_offset + pos,
            line_number,
        )
        .with_value(value)
        .with_comment(&line.comment),
    )
}

/// Path of an include operand: the first quoted string, or the first word.
fn include_path(operand: &str, skip_qualifier: bool) -> String {
    let operand = if skip_qualifier {
        operand
            .trim_start()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest)
            .unwrap_or_default()
    } else {
        operand
    };
    for quote in ['"', '\''] {
        if let Some(start) = operand.find(quote) {
            if let Some(len) = operand[start + 1..].find(quote) {
                return operand[start + 1..start + 1 + len].to_string();
            }
        }
    }
    operand
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::{tokenize_line, CommentState};

    fn run(dialect: Dialect, source: &str) -> Vec<ClassificationEvent> {
        let mut classifier = Classifier::new(dialect);
        let mut state = CommentState::default();
        let mut offset = 0usize;
        let mut events = Vec::new();
        for (idx, text) in source.split('\n').enumerate() {
            let line = tokenize_line(text, offset, &dialect.syntax().comments, &mut state);
            events.extend(classifier.classify(idx as u32 + 1, &line));
            offset += text.len() + 1;
        }
        events
    }

    fn defined(events: &[ClassificationEvent]) -> Vec<(DefinitionKind, String)> {
        events
            .iter()
            .filter_map(ClassificationEvent::definition)
            .map(|def| (def.kind, def.name.clone()))
            .collect()
    }

    #[test]
    fn equate_and_label_rules() {
        let events = run(Dialect::Merlin32, "LOOP EQU $40\nSTART LDA #1\n LDA #2");
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Equate, "LOOP".to_string()),
                (DefinitionKind::Label, "START".to_string()),
            ]
        );
        let ClassificationEvent::Define(def) = &events[0] else {
            panic!("expected define");
        };
        assert_eq!(def.value, "$40");
        assert_eq!(def.offset, 0);
        assert_eq!(def.line, 1);
    }

    #[test]
    fn unknown_instruction_with_symbol_is_label() {
        let events = run(Dialect::Mads, "data dta b(1,2)\n  frobnicate 1");
        assert_eq!(defined(&events), vec![(DefinitionKind::Label, "data".to_string())]);
    }

    #[test]
    fn merlin_macro_body_is_opaque() {
        let source = "DELAY MAC\nINNER LDA #1\n <<<\nAFTER RTS";
        let events = run(Dialect::Merlin32, source);
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Macro, "DELAY".to_string()),
                (DefinitionKind::Label, "AFTER".to_string()),
            ]
        );
    }

    #[test]
    fn nested_macro_tokens_keep_body_open() {
        let source = "\tMAC outer\n\tMAC inner\n\tENDM\nhidden nop\n\tENDM\nvisible nop";
        let events = run(Dialect::Dasm, source);
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Macro, "outer".to_string()),
                (DefinitionKind::Label, "visible".to_string()),
            ]
        );
    }

    #[test]
    fn repeat_block_suppresses_definitions() {
        let source = "table .rept 4\nentry .byte 0\n .endr\nnext nop";
        let events = run(Dialect::Mads, source);
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Label, "table".to_string()),
                (DefinitionKind::Label, "next".to_string()),
            ]
        );
    }

    #[test]
    fn brace_bodies_track_balance() {
        let source = "!macro wait .n {\n  !if .n > 0 {\n.x nop\n  }\n}\nafter nop\n!macro one { nop }\nlast nop";
        let events = run(Dialect::Acme, source);
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Macro, "wait".to_string()),
                (DefinitionKind::Label, "after".to_string()),
                (DefinitionKind::Macro, "one".to_string()),
                (DefinitionKind::Label, "last".to_string()),
            ]
        );
    }

    #[test]
    fn sections_open_and_close() {
        let source = "  .proc init\nloop nop\n  .endp\n  .endp";
        let events = run(Dialect::Mads, source);
        assert!(matches!(&events[0], ClassificationEvent::OpenSection(def) if def.name == "init" && def.offset == 8));
        assert!(matches!(&events[1], ClassificationEvent::Define(def) if def.name == "loop"));
        assert!(matches!(
            events[2],
            ClassificationEvent::CloseSection { kind: DefinitionKind::Procedure, line: 3, .. }
        ));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn closing_outer_section_closes_inner_ones() {
        let source = " .proc outer\n .local inner\n .endp";
        let mut classifier = Classifier::new(Dialect::Mads);
        let mut offset = 0;
        let mut events = Vec::new();
        for (idx, text) in source.split('\n').enumerate() {
            let line = crate::core::tokenizer::tokenize(text, offset, &Dialect::Mads.syntax().comments);
            events.extend(classifier.classify(idx as u32 + 1, &line));
            offset += text.len() + 1;
        }
        let closes: Vec<DefinitionKind> = events
            .iter()
            .filter_map(|event| match event {
                ClassificationEvent::CloseSection { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(closes, vec![DefinitionKind::LocalSection, DefinitionKind::Procedure]);
        assert!(classifier.open_sections().is_empty());
    }

    #[test]
    fn implicit_sections_close_previous() {
        let source = "first SUBROUTINE\n.loop dex\nsecond SUBROUTINE\n.loop dey";
        let events = run(Dialect::Dasm, source);
        let kinds: Vec<&str> = events
            .iter()
            .map(|event| match event {
                ClassificationEvent::Define(_) => "define",
                ClassificationEvent::OpenSection(_) => "open",
                ClassificationEvent::CloseSection { .. } => "close",
            })
            .collect();
        assert_eq!(kinds, vec!["open", "define", "close", "open", "define"]);
    }

    #[test]
    fn operand_equates_and_includes() {
        let source = ".const SCREEN = $0400\n#import \"lib/macros.asm\"\n.import binary \"logo.bin\"";
        let events = run(Dialect::KickAss, source);
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Equate, "SCREEN".to_string()),
                (DefinitionKind::SourceInclude, "lib/macros.asm".to_string()),
                (DefinitionKind::BinaryInclude, "logo.bin".to_string()),
            ]
        );
        let ClassificationEvent::Define(def) = &events[0] else {
            panic!("expected define");
        };
        assert_eq!(def.value, "$0400");
        assert_eq!(def.offset, 7);
        assert_eq!(def.column, 7);
        let ClassificationEvent::Define(include) = &events[2] else {
            panic!("expected define");
        };
        assert_eq!(include.line, 3);
        assert_eq!(include.column, 16);
    }

    #[test]
    fn extra_equate_tokens_extend_dialect() {
        let mut classifier = Classifier::new(Dialect::Mads).with_extra_equates(["SET"]);
        let line = crate::core::tokenizer::tokenize("count SET 3", 0, &Dialect::Mads.syntax().comments);
        let events = classifier.classify(1, &line);
        assert_eq!(defined(&events), vec![(DefinitionKind::Equate, "count".to_string())]);
    }

    #[test]
    fn braces_inside_strings_do_not_nest_bodies() {
        let events = run(
            Dialect::KickAss,
            ".macro Print() {\n  .text \"{\"\n}\nafter: nop\nlater: rts",
        );
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Macro, "Print".to_string()),
                (DefinitionKind::Label, "after".to_string()),
                (DefinitionKind::Label, "later".to_string()),
            ]
        );

        let events = run(
            Dialect::Acme,
            "!macro print {\n  !text \"}}\", '{'\n}\nafter nop\nlater rts",
        );
        assert_eq!(
            defined(&events),
            vec![
                (DefinitionKind::Macro, "print".to_string()),
                (DefinitionKind::Label, "after".to_string()),
                (DefinitionKind::Label, "later".to_string()),
            ]
        );
    }

    #[test]
    fn unmatched_close_is_ignored() {
        let events = run(Dialect::Tass, "  .pend\nok nop");
        assert_eq!(defined(&events), vec![(DefinitionKind::Label, "ok".to_string())]);
    }

    #[test]
    fn block_state_transitions() {
        let state = BlockState::enter_macro("m".to_string(), false, "MAC m");
        assert_eq!(state, BlockState::InMacroBody { name: "m".to_string(), depth: 1 });
        let state = state.advance(1).advance(-1);
        assert!(state.is_opaque());
        assert_eq!(state.advance(-1), BlockState::Normal);

        assert_eq!(BlockState::enter_repeat(true, "!for i, 1, 3 { nop }"), BlockState::Normal);
        let waiting = BlockState::enter_repeat(true, "!do");
        assert_eq!(waiting, BlockState::InRepeatBlock { depth: 0 });
        assert_eq!(waiting.clone().advance(1), BlockState::InRepeatBlock { depth: 1 });
        assert_eq!(waiting.advance(0), BlockState::InRepeatBlock { depth: 0 });
    }
}
