// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn create_temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join(format!("test-{label}-{}-{nanos}", process::id()));
    fs::create_dir_all(&dir).expect("Create temp dir");
    dir
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("Write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_asmoutline"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Run asmoutline")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn outline_prints_nested_tree() {
    let dir = create_temp_dir("cli-outline");
    let source = dir.join("game.asm");
    write_file(&source, " .proc init\nloop nop\n .endp\nmax = 8\n");

    let output = run(&["outline", source.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "procedure init (1:8) .. line 3\n  label loop (2:1)\nequate max (4:1) = 8\n"
    );
}

#[test]
fn symbols_json_is_one_document() {
    let dir = create_temp_dir("cli-symbols");
    let source = dir.join("main.s");
    write_file(&source, "LOOP EQU $40\nLOOP EQU $50\n");

    let output = run(&[
        "--format",
        "json",
        "symbols",
        source.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["dialect"], "merlin32");
    assert_eq!(value["symbols"][0]["name"], "LOOP");
    assert_eq!(value["symbols"][0]["value"], "$40");
    assert_eq!(value["symbols"][0]["conflicts"][0]["line"], 2);
}

#[test]
fn invalid_property_value_exits_with_one() {
    let dir = create_temp_dir("cli-properties");
    let source = dir.join("demo.asm");
    write_file(
        &source,
        "; @com.wudsn.ide.lng.hardware=AMIGA\n; @com.wudsn.ide.lng.mainsourcefile=main.asm\n",
    );

    let output = run(&["properties", source.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("@com.wudsn.ide.lng.hardware=AMIGA in line 1"));
    assert!(text.contains("line 1: error: Invalid value 'AMIGA'"));
}

#[test]
fn log_with_source_shows_context() {
    let dir = create_temp_dir("cli-log");
    let source = dir.join("file.asm");
    let log = dir.join("build.log");
    write_file(&source, "start lda #0\n\tsta $d020\n");
    write_file(&log, "error: file.asm(2): undefined symbol FOO\n  additional context\n");

    let output = run(&[
        "log",
        log.to_str().expect("utf-8 path"),
        "--dialect",
        "asm6",
        "--source",
        source.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "file.asm:2: error: undefined symbol FOO\n      additional context\n    2 | \tsta $d020\n"
    );

    let output = run(&[
        "--format",
        "json",
        "log",
        log.to_str().expect("utf-8 path"),
        "--dialect",
        "asm6",
        "--source",
        source.to_str().expect("utf-8 path"),
    ]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["diagnostics"][0]["line"], 2);
    assert_eq!(value["markers"][0]["start_offset"], 13);
}

#[test]
fn usage_and_config_errors_exit_with_two() {
    let dir = create_temp_dir("cli-errors");
    let source = dir.join("notes.txt");
    write_file(&source, "hello\n");

    let output = run(&["outline", source.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--dialect"));

    let config = dir.join("asmoutline.toml");
    write_file(&config, "default_dialect = \"ca65\"\n");
    let output = run(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "outline",
        source.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let output = run(&["outline", dir.join("missing.asm").to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_default_dialect_applies() {
    let dir = create_temp_dir("cli-config");
    let source = dir.join("notes.txt");
    let config = dir.join("asmoutline.toml");
    write_file(&source, "first SUBROUTINE\n.loop dex\n");
    write_file(&config, "default_dialect = \"dasm\"\n");

    let output = run(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "outline",
        source.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "local first (1:1) .. line 2\n  label .loop (2:1)\n");
}
