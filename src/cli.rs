// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and command execution.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use crate::compiler_log::{parse_log, Diagnostic};
use crate::config::IndexerConfig;
use crate::core::error::IndexError;
use crate::core::line_map::LineMap;
use crate::core::severity::Severity;
use crate::dialect::Dialect;
use crate::document::index_document;
use crate::markers::resolve_markers;
use crate::report;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Outline, symbol and compiler-log tool for 6502 assembler and Mad Pascal sources.

Supported dialects: acme, asm6, atasm, dasm, kickass, mads, merlin32, tass, xasm, madpascal.
When --dialect is omitted, the config's default_dialect is used, then the file extension
(.pas madpascal, .s merlin32, .a acme, .asx xasm, .asm mads).
Exit status is 0 on success, 1 when errors were reported and 2 on usage or configuration errors.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "asmoutline",
    version = VERSION,
    about = "Outline, symbol and compiler-log tool for assembler and Mad Pascal sources",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        long_help = "Read indexer settings from a TOML file. Defaults are used when omitted."
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long = "format",
        value_enum,
        global = true,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format. text is default; json prints one JSON document."
    )]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the outline tree of a source file.
    Outline {
        file: PathBuf,
        #[arg(long = "dialect", value_name = "ID")]
        dialect: Option<String>,
    },
    /// Print the symbol table of a source file with conflicts.
    Symbols {
        file: PathBuf,
        #[arg(long = "dialect", value_name = "ID")]
        dialect: Option<String>,
    },
    /// Print directive properties declared in comments and check them.
    Properties {
        file: PathBuf,
        #[arg(long = "dialect", value_name = "ID")]
        dialect: Option<String>,
    },
    /// Parse compiler output into diagnostics.
    Log {
        logfile: PathBuf,
        #[arg(
            long = "dialect",
            value_name = "ID",
            long_help = "Dialect of the compiler that wrote the log. Falls back to the config's default_dialect."
        )]
        dialect: Option<String>,
        #[arg(
            long = "source",
            value_name = "FILE",
            long_help = "Resolve diagnostics for FILE to source positions and show the offending lines."
        )]
        source: Option<PathBuf>,
    },
}

/// Rendered command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub errors_reported: bool,
}

/// Pick the dialect: explicit id, then config default, then file extension.
pub fn resolve_dialect(
    explicit: Option<&str>,
    config: &IndexerConfig,
    path: &Path,
) -> Result<Dialect, IndexError> {
    if let Some(id) = explicit {
        return Dialect::from_id(id);
    }
    if let Some(dialect) = config.default_dialect()? {
        return Ok(dialect);
    }
    Dialect::from_path(path).ok_or_else(|| {
        IndexError::invalid_argument(
            "dialect",
            format!("cannot infer a dialect for '{}'; pass --dialect", path.display()),
        )
    })
}

pub fn load_config(cli: &Cli) -> Result<IndexerConfig, IndexError> {
    match &cli.config {
        Some(path) => IndexerConfig::load_from_path(path),
        None => Ok(IndexerConfig::default()),
    }
}

fn read_text(path: &Path) -> Result<String, IndexError> {
    fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the selected subcommand.
pub fn execute(cli: &Cli, use_color: bool) -> Result<CommandOutput, IndexError> {
    let config = load_config(cli)?;
    let json = cli.format == OutputFormat::Json;
    match &cli.command {
        Command::Outline { file, dialect }
        | Command::Symbols { file, dialect }
        | Command::Properties { file, dialect } => {
            let dialect = resolve_dialect(dialect.as_deref(), &config, file)?;
            let text = read_text(file)?;
            info!("indexing '{}' as {}", file.display(), dialect.display_name());
            let index = index_document(&text, dialect, &config);
            let errors_reported = index
                .property_diagnostics
                .iter()
                .any(|diagnostic| diagnostic.severity == Severity::Error);
            let text = match (&cli.command, json) {
                (Command::Outline { .. }, false) => report::render_outline(&index),
                (Command::Outline { .. }, true) => {
                    report::to_json_string(&report::outline_json(&index))
                }
                (Command::Symbols { .. }, false) => report::render_symbols(&index),
                (Command::Symbols { .. }, true) => {
                    report::to_json_string(&report::symbols_json(&index))
                }
                (_, false) => report::render_properties(&index),
                (_, true) => report::to_json_string(&report::properties_json(&index)),
            };
            Ok(CommandOutput {
                text,
                errors_reported,
            })
        }
        Command::Log {
            logfile,
            dialect,
            source,
        } => {
            let dialect = match dialect {
                Some(id) => Dialect::from_id(id)?,
                None => config.default_dialect()?.ok_or_else(|| {
                    IndexError::invalid_argument("dialect", "the log command needs --dialect")
                })?,
            };
            let log_text = read_text(logfile)?;
            let diagnostics: Vec<Diagnostic> = parse_log(&log_text, dialect).collect();
            let errors_reported = diagnostics
                .iter()
                .any(|diagnostic| diagnostic.severity == Severity::Error);
            let source = match source {
                Some(path) => Some((path.as_path(), LineMap::new(&read_text(path)?))),
                None => None,
            };
            let text = if json {
                let markers = source
                    .as_ref()
                    .map(|(path, lines)| resolve_markers(&diagnostics, lines, path));
                report::to_json_string(&report::log_json(&diagnostics, markers.as_deref()))
            } else {
                let context = source.as_ref().map(|(path, lines)| (*path, lines));
                report::render_diagnostics(&diagnostics, context, use_color)
            };
            Ok(CommandOutput {
                text,
                errors_reported,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "asmoutline",
            "outline",
            "game.asm",
            "--dialect",
            "dasm",
            "--format",
            "json",
        ])
        .expect("valid arguments");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Command::Outline { ref dialect, .. } if dialect.as_deref() == Some("dasm")
        ));

        let cli = Cli::try_parse_from([
            "asmoutline",
            "--config",
            "asmoutline.toml",
            "log",
            "build.log",
            "--dialect",
            "mads",
            "--source",
            "game.asm",
        ])
        .expect("valid arguments");
        assert_eq!(cli.config.as_deref(), Some(Path::new("asmoutline.toml")));
        assert!(matches!(cli.command, Command::Log { source: Some(_), .. }));
    }

    #[test]
    fn rejects_bad_format_and_missing_file() {
        assert!(Cli::try_parse_from(["asmoutline", "--format", "xml", "outline", "a.asm"]).is_err());
        assert!(Cli::try_parse_from(["asmoutline", "symbols"]).is_err());
    }

    #[test]
    fn dialect_resolution_order() {
        let mut config = IndexerConfig::default();
        let path = Path::new("demo.pas");
        assert_eq!(
            resolve_dialect(None, &config, path).expect("from extension"),
            Dialect::MadPascal
        );
        config.default_dialect = Some("acme".to_string());
        assert_eq!(resolve_dialect(None, &config, path).expect("from config"), Dialect::Acme);
        assert_eq!(
            resolve_dialect(Some("kick"), &config, path).expect("explicit"),
            Dialect::KickAss
        );
        assert!(matches!(
            resolve_dialect(None, &IndexerConfig::default(), Path::new("README")),
            Err(IndexError::InvalidArgument { name: "dialect", .. })
        ));
    }
}
