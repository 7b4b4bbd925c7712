// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use std::path::Path;

use proptest::prelude::*;

use asmoutline::compiler_log::{parse_log, Diagnostic};
use asmoutline::config::IndexerConfig;
use asmoutline::core::{LineMap, Severity};
use asmoutline::dialect::Dialect;
use asmoutline::document::{index_document, Indexer};
use asmoutline::index::DefinitionKind;
use asmoutline::markers::resolve_markers;

#[test]
fn single_equate_is_indexed() {
    let index = Indexer::new(Dialect::Merlin32).index("LOOP EQU $40\n");
    let nodes = index.outline.walk();
    assert_eq!(nodes.len(), 1);
    let def = &nodes[0].1.definition;
    assert_eq!(def.kind, DefinitionKind::Equate);
    assert_eq!(def.name, "LOOP");
    assert_eq!(def.value, "$40");
    assert_eq!(def.line, 1);
}

#[test]
fn redefinition_keeps_first_and_records_conflict() {
    let index = Indexer::new(Dialect::Merlin32).index("LOOP EQU $40\nLOOP EQU $50\n");
    let symbol = index.symbols.get("LOOP").expect("LOOP is defined");
    assert_eq!((symbol.value.as_str(), symbol.line), ("$40", 1));
    assert_eq!(symbol.conflicts.len(), 1);
    assert_eq!(symbol.conflicts[0].line, 2);
    assert_eq!(index.symbols.len(), 1);
    // Both definitions stay visible in the outline.
    assert_eq!(index.outline.len(), 2);
}

#[test]
fn first_property_declaration_wins() {
    let source = "; @ns.hardware=ATARI8BIT\n\tlda #0\n; @ns.hardware=C64\n";
    let index = Indexer::new(Dialect::Mads).with_namespace("ns").index(source);
    let hardware = index
        .properties
        .get("@ns.hardware")
        .expect("valid key")
        .expect("declared");
    assert_eq!(hardware.value, "ATARI8BIT");
    assert_eq!(hardware.line_number, 1);
    assert_eq!(index.properties.history("@ns.hardware").len(), 2);
    assert_eq!(index.property_diagnostics.len(), 1);
    assert_eq!(index.property_diagnostics[0].severity, Severity::Warning);
}

#[test]
fn log_continuation_lines_join_the_diagnostic() {
    let log = "error: file.asm(12): undefined symbol FOO\n  additional context\n";
    let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::Asm6).collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].file_path.as_deref(), Some("file.asm"));
    assert_eq!(diagnostics[0].line, Some(12));
    assert_eq!(
        diagnostics[0].message,
        "undefined symbol FOO\n  additional context"
    );
}

#[test]
fn log_diagnostics_resolve_into_the_document() {
    let source = "start lda #0\n\tsta $d020\n\tjmp start\n";
    let log = "error: src/file.asm(2): bad store\nwarning: other.asm(1): elsewhere\n";
    let diagnostics: Vec<Diagnostic> = parse_log(log, Dialect::Asm6).collect();
    let markers = resolve_markers(&diagnostics, &LineMap::new(source), Path::new("file.asm"));
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].line, 2);
    assert_eq!(&source[markers[0].start_offset..markers[0].end_offset], "\tsta $d020");
}

#[test]
fn nested_sections_scope_their_labels() {
    let source = " .proc outer\nloop nop\n .local inner\nloop dex\n .endl\n jmp loop\n .endp\n";
    let index = index_document(source, Dialect::Mads, &IndexerConfig::default());

    let outline: Vec<(usize, &str)> = index
        .outline
        .walk()
        .into_iter()
        .map(|(depth, node)| (depth, node.definition.name.as_str()))
        .collect();
    assert_eq!(
        outline,
        vec![(0, "outer"), (1, "loop"), (1, "inner"), (2, "loop")]
    );
    assert_eq!(index.symbols.conflicts().count(), 0);

    let jump = source.find("jmp loop").expect("jump");
    assert_eq!(index.resolve_at("loop", jump).map(|s| s.line), Some(2));
    let inner = source.find("dex").expect("inner body");
    assert_eq!(index.resolve_at("LOOP", inner).map(|s| s.line), Some(4));
    assert_eq!(
        index.definition_at(inner).map(|n| n.definition.name.as_str()),
        Some("inner")
    );
}

#[test]
fn every_dialect_indexes_without_panicking() {
    let source = "; comment\nlabel lda #1\nvalue = 3\n\t.include \"x.inc\"\n}\n end\n";
    for dialect in Dialect::ALL {
        let index = index_document(source, dialect, &IndexerConfig::default());
        assert_eq!(index.dialect, dialect);
        assert_eq!(index.lines.len(), 6);
    }
}

fn source_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,5}",
        "[a-z][a-z0-9]{0,5} (nop|lda #1)",
        "[a-z][a-z0-9]{0,5} = [0-9]{1,3}",
        "[a-z][a-z0-9]{0,5} EQU \\$[0-9a-f]{2}",
        "(const|var) [a-z]{1,6} = [0-9]{1,2};",
        "procedure [a-z]{1,6};",
        Just(" lda #1 ; note".to_string()),
        Just("\t.include \"lib.s\"".to_string()),
        Just(" icl 'lib.inc'".to_string()),
        Just("{$I 'lib.inc'}".to_string()),
        Just("begin".to_string()),
        Just("end;".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn offsets_map_to_positions_and_back(
        text in "[a-z ;]{0,8}(\n[a-z ;]{0,8}){0,6}",
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!text.is_empty());
        let lines = LineMap::new(&text);
        let offset = pick.index(text.len());
        let (line, column) = lines.position_of(offset).expect("offset inside text");
        prop_assert_eq!(lines.offset_of(line, column), Some(offset));
    }

    #[test]
    fn definitions_point_back_at_their_names(
        lines in proptest::collection::vec(source_line(), 1..12),
        crlf in any::<bool>(),
    ) {
        let text = lines.join(if crlf { "\r\n" } else { "\n" });
        for dialect in Dialect::ALL {
            let index = index_document(&text, dialect, &IndexerConfig::default());
            for (_, node) in index.outline.walk() {
                let def = &node.definition;
                prop_assert_eq!(
                    index.lines.position_of(def.offset),
                    Some((def.line, def.column)),
                    "{} {:?} in {:?}", dialect, def.name, text
                );
                prop_assert_eq!(
                    text.get(def.offset..def.offset + def.name.len()),
                    Some(def.name.as_str()),
                    "{} in {:?}", dialect, text
                );
            }
        }
    }

    #[test]
    fn every_dialect_accounts_for_every_log_line(
        lines in proptest::collection::vec("[ -~]{0,24}", 0..10),
        dialect in prop::sample::select(Dialect::ALL.to_vec()),
    ) {
        let log = lines.join("\n");
        let total: u32 = parse_log(&log, dialect).map(|d| d.log_line_count).sum();
        prop_assert_eq!(total as usize, log.lines().count());
    }
}
