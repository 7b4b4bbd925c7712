// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Text and JSON rendering for the command-line front end.

use std::fmt::Write as _;
use std::path::Path;

use serde_json::{json, Value};

use crate::compiler_log::Diagnostic;
use crate::core::line_map::LineMap;
use crate::core::text_utils::truncate_chars;
use crate::document::DocumentIndex;
use crate::markers::{resolve_markers, Marker};

const VALUE_WIDTH: usize = 40;

pub fn highlight_line(line: &str, column: Option<usize>, use_color: bool) -> String {
    match column {
        Some(col) if col > 0 => {
            let Some((idx, ch)) = line.char_indices().nth(col - 1) else {
                if use_color {
                    return format!("{line}\x1b[31m^\x1b[0m");
                }
                return format!("{line}^");
            };
            let head = &line[..idx];
            let rest = &line[idx + ch.len_utf8()..];
            if use_color {
                format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
            } else {
                format!("{head}{ch}{rest}")
            }
        }
        _ => line.to_string(),
    }
}

pub fn to_json_string(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn render_outline(index: &DocumentIndex) -> String {
    let mut out = String::new();
    for (depth, node) in index.outline.walk() {
        let def = &node.definition;
        let _ = write!(
            out,
            "{:indent$}{} {} ({}:{})",
            "",
            def.kind.as_str(),
            def.name,
            def.line,
            def.column + 1,
            indent = depth * 2
        );
        if !def.value.is_empty() && def.value != def.name {
            let _ = write!(out, " = {}", def.value);
        }
        if def.kind.is_section() && node.end_line > def.line {
            let _ = write!(out, " .. line {}", node.end_line);
        }
        out.push('\n');
    }
    out
}

pub fn render_symbols(index: &DocumentIndex) -> String {
    let mut out = String::new();
    for symbol in index.symbols.symbols() {
        let scope = index
            .symbols
            .scope(symbol.scope_id)
            .map(|scope| scope.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("<root>");
        let _ = writeln!(
            out,
            "{}\t{}\t{}:{}\t{}\t{}",
            symbol.name,
            symbol.kind.as_str(),
            symbol.line,
            symbol.column + 1,
            scope,
            truncate_chars(&symbol.value, VALUE_WIDTH)
        );
        for conflict in &symbol.conflicts {
            let _ = writeln!(
                out,
                "  warning: '{}' redefined as {} in line {}; line {} wins",
                conflict.name,
                conflict.kind.as_str(),
                conflict.line,
                symbol.line
            );
        }
    }
    out
}

pub fn render_properties(index: &DocumentIndex) -> String {
    let mut out = String::new();
    for property in index.properties.iter() {
        let _ = writeln!(out, "{property}");
    }
    for diagnostic in &index.property_diagnostics {
        let _ = writeln!(
            out,
            "line {}: {}: {}",
            diagnostic.line, diagnostic.severity, diagnostic.message
        );
    }
    out
}

/// Render diagnostics, with the offending source line when the diagnostic
/// belongs to `source`.
pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    source: Option<(&Path, &LineMap)>,
    use_color: bool,
) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let mut location = String::new();
        if let Some(file) = &diagnostic.file_path {
            location.push_str(file);
            if let Some(line) = diagnostic.line {
                let _ = write!(location, ":{line}");
                if let Some(column) = diagnostic.column {
                    let _ = write!(location, ":{column}");
                }
            }
            location.push_str(": ");
        }
        let mut message_lines = diagnostic.message.lines();
        let first = message_lines.next().unwrap_or_default();
        let _ = writeln!(out, "{location}{}: {first}", diagnostic.severity);
        for line in message_lines {
            let _ = writeln!(out, "    {line}");
        }

        let Some((path, lines)) = source else {
            continue;
        };
        let context = resolve_markers([diagnostic], lines, path)
            .first()
            .filter(|marker| marker.line > 0)
            .and_then(|marker| lines.line(marker.line));
        if let Some(line) = context {
            let column = diagnostic.column.map(|column| column as usize);
            let _ = writeln!(
                out,
                "{:>5} | {}",
                line.number,
                highlight_line(&line.text, column, use_color)
            );
        }
    }
    out
}

pub fn outline_json(index: &DocumentIndex) -> Value {
    json!({
        "dialect": index.dialect,
        "outline": index.outline.to_json(),
    })
}

pub fn symbols_json(index: &DocumentIndex) -> Value {
    let symbols: Vec<&_> = index.symbols.symbols().collect();
    json!({
        "dialect": index.dialect,
        "case_sensitive": index.symbols.is_case_sensitive(),
        "scopes": index.symbols.scopes(),
        "symbols": symbols,
    })
}

pub fn properties_json(index: &DocumentIndex) -> Value {
    let properties: Vec<_> = index.properties.iter().collect();
    json!({
        "properties": properties,
        "diagnostics": index.property_diagnostics,
    })
}

pub fn log_json(diagnostics: &[Diagnostic], markers: Option<&[Marker]>) -> Value {
    let mut value = json!({ "diagnostics": diagnostics });
    if let (Some(markers), Value::Object(map)) = (markers, &mut value) {
        map.insert("markers".to_string(), json!(markers));
    }
    value
}
