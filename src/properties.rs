// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Document-level directive properties.
//!
//! Properties are written in comments as `@<namespace>.<key>=<value>`. The
//! first declaration of a key wins; later declarations are kept in the
//! history so that the validation pass can point at them.

use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::core::error::IndexError;
use crate::core::severity::Severity;

pub const DEFAULT_NAMESPACE: &str = "com.wudsn.ide.lng";

pub const HARDWARE_VALUES: &[&str] = &[
    "ATARI2600",
    "ATARI5200",
    "ATARI7800",
    "ATARI8BIT",
    "APPLE2",
    "C64",
    "NES",
    "GENERIC",
];

pub const OUTPUT_FOLDER_MODE_VALUES: &[&str] = &["SOURCE_FOLDER", "TEMP_FOLDER", "FIXED_FOLDER"];

/// Property keys with a meaning of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownKey {
    Hardware,
    MainSourceFile,
    OutputFolderMode,
    OutputFolder,
    OutputFileExtension,
    OutputFile,
}

impl KnownKey {
    pub const ALL: [KnownKey; 6] = [
        KnownKey::Hardware,
        KnownKey::MainSourceFile,
        KnownKey::OutputFolderMode,
        KnownKey::OutputFolder,
        KnownKey::OutputFileExtension,
        KnownKey::OutputFile,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            KnownKey::Hardware => "hardware",
            KnownKey::MainSourceFile => "mainsourcefile",
            KnownKey::OutputFolderMode => "outputfoldermode",
            KnownKey::OutputFolder => "outputfolder",
            KnownKey::OutputFileExtension => "outputfileextension",
            KnownKey::OutputFile => "outputfile",
        }
    }

    /// Full key as written in source, e.g. `@com.wudsn.ide.lng.hardware`.
    pub fn key(self, namespace: &str) -> String {
        format!("@{namespace}.{}", self.suffix())
    }

    fn allowed_values(self) -> Option<&'static [&'static str]> {
        match self {
            KnownKey::Hardware => Some(HARDWARE_VALUES),
            KnownKey::OutputFolderMode => Some(OUTPUT_FOLDER_MODE_VALUES),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageProperty {
    pub key: String,
    pub value: String,
    /// 1-based line, or 0 when the line is unknown.
    pub line_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDiagnostic {
    pub severity: Severity,
    pub key: String,
    pub line: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageProperties {
    properties: BTreeMap<String, LanguageProperty>,
    history: BTreeMap<String, Vec<LanguageProperty>>,
}

impl LanguageProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` unless the key already has a value.
    ///
    /// Every attempt is appended to the key's history.
    pub fn put(&mut self, key: &str, value: &str, line_number: u32) -> Result<(), IndexError> {
        check_key(key)?;
        let property = LanguageProperty {
            key: key.to_string(),
            value: value.to_string(),
            line_number,
        };
        self.history
            .entry(key.to_string())
            .or_default()
            .push(property.clone());
        self.properties.entry(key.to_string()).or_insert(property);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<&LanguageProperty>, IndexError> {
        check_key(key)?;
        Ok(self.properties.get(key))
    }

    /// All attempted writes for `key`, in order.
    pub fn history(&self, key: &str) -> &[LanguageProperty] {
        self.history.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Effective properties ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &LanguageProperty> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Check for duplicate declarations and invalid values of known keys.
    pub fn validate(&self, namespace: &str) -> Vec<PropertyDiagnostic> {
        let mut diagnostics = Vec::new();
        for (key, attempts) in &self.history {
            let Some((first, later)) = attempts.split_first() else {
                continue;
            };
            for duplicate in later {
                warn!(
                    "line {}: property '{key}' already defined in line {}",
                    duplicate.line_number, first.line_number
                );
                diagnostics.push(PropertyDiagnostic {
                    severity: Severity::Warning,
                    key: key.clone(),
                    line: duplicate.line_number,
                    message: format!(
                        "Property '{key}' is already defined in line {}; value '{}' is ignored",
                        first.line_number, duplicate.value
                    ),
                });
            }
        }

        for known in KnownKey::ALL {
            let Some(allowed) = known.allowed_values() else {
                continue;
            };
            let key = known.key(namespace);
            let Some(property) = self.properties.get(&key) else {
                continue;
            };
            if !allowed.contains(&property.value.as_str()) {
                diagnostics.push(PropertyDiagnostic {
                    severity: Severity::Error,
                    key,
                    line: property.line_number,
                    message: format!(
                        "Invalid value '{}' for property '{}'; expected one of {}",
                        property.value,
                        property.key,
                        allowed.join(", ")
                    ),
                });
            }
        }
        diagnostics.sort_by_key(|diagnostic| diagnostic.line);
        diagnostics
    }
}

impl std::fmt::Display for LanguageProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={} in line {}", self.key, self.value, self.line_number)
    }
}

fn check_key(key: &str) -> Result<(), IndexError> {
    if key.is_empty() {
        return Err(IndexError::invalid_argument("key", "must not be empty"));
    }
    Ok(())
}

/// Find a `@<namespace>.<key>=<value>` directive in comment text.
pub fn parse_directive<'a>(comment: &'a str, namespace: &str) -> Option<(&'a str, &'a str)> {
    let marker = format!("@{namespace}.");
    let start = comment.find(&marker)?;
    let rest = &comment[start..];
    let eq = rest.find('=')?;
    let key = rest[..eq].trim_end();
    if key.len() <= marker.len() || key.contains(char::is_whitespace) {
        return None;
    }
    let mut value = &rest[eq + 1..];
    for terminator in ["*/", "*)", "}"] {
        if let Some(pos) = value.find(terminator) {
            value = &value[..pos];
        }
    }
    Some((key, value.trim()))
}

/// Collect properties from the comments of a document, line by line.
pub fn scan_properties<'a, I>(comments: I, namespace: &str) -> LanguageProperties
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    let mut properties = LanguageProperties::new();
    for (line_number, comment) in comments {
        if let Some((key, value)) = parse_directive(comment, namespace) {
            if let Err(err) = properties.put(key, value, line_number) {
                warn!("line {line_number}: ignoring property directive: {err}");
            }
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_put_wins_and_history_keeps_every_attempt() {
        let mut properties = LanguageProperties::new();
        properties.put("@ns.hardware", "ATARI8BIT", 1).expect("valid key");
        properties.put("@ns.hardware", "C64", 7).expect("valid key");

        let property = properties.get("@ns.hardware").expect("valid key").expect("defined");
        assert_eq!(property.value, "ATARI8BIT");
        assert_eq!(property.line_number, 1);
        assert_eq!(properties.history("@ns.hardware").len(), 2);
        assert_eq!(properties.len(), 1);
        assert_eq!(property.to_string(), "@ns.hardware=ATARI8BIT in line 1");
    }

    #[test]
    fn empty_key_is_a_contract_violation() {
        let mut properties = LanguageProperties::new();
        assert!(matches!(
            properties.put("", "x", 1),
            Err(IndexError::InvalidArgument { name: "key", .. })
        ));
        assert!(properties.get("").is_err());
        assert!(properties.history("missing").is_empty());
    }

    #[test]
    fn directives_are_found_in_comments() {
        assert_eq!(
            parse_directive("@ns.hardware=ATARI8BIT", "ns"),
            Some(("@ns.hardware", "ATARI8BIT"))
        );
        assert_eq!(
            parse_directive("see @com.wudsn.ide.lng.outputfile = game.xex */", DEFAULT_NAMESPACE),
            Some(("@com.wudsn.ide.lng.outputfile", "game.xex"))
        );
        assert_eq!(parse_directive("@other.hardware=C64", "ns"), None);
        assert_eq!(parse_directive("@ns.=x", "ns"), None);
        assert_eq!(parse_directive("@ns.hardware", "ns"), None);
    }

    #[test]
    fn scanning_keeps_first_declaration() {
        let comments = [(1, "@ns.hardware=ATARI8BIT"), (2, "plain"), (5, "@ns.hardware=C64")];
        let properties = scan_properties(comments, "ns");
        let property = properties.get("@ns.hardware").expect("valid key").expect("defined");
        assert_eq!((property.value.as_str(), property.line_number), ("ATARI8BIT", 1));
    }

    #[test]
    fn scanning_skips_directives_without_a_key() {
        let comments = [(1, "@ns.=x"), (2, "@ns. =y"), (3, "@ns.outputfile=a.xex")];
        let properties = scan_properties(comments, "ns");
        assert_eq!(properties.len(), 1);
        assert!(properties.history("@ns.").is_empty());
        assert!(properties.validate("ns").is_empty());
    }

    #[test]
    fn validation_flags_duplicates_and_bad_values() {
        let comments = [
            (2, "@ns.hardware=AMIGA"),
            (4, "@ns.outputfoldermode=SOURCE_FOLDER"),
            (9, "@ns.hardware=C64"),
            (11, "@ns.custom=anything"),
        ];
        let diagnostics = scan_properties(comments, "ns").validate("ns");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].message.contains("AMIGA"));
        assert_eq!(diagnostics[1].severity, Severity::Warning);
        assert_eq!(diagnostics[1].line, 9);
        assert!(diagnostics[1].message.contains("line 2"));
    }

    proptest! {
        #[test]
        fn put_is_idempotent_after_first_write(
            key in "@[a-z]{1,8}\\.[a-z]{1,8}",
            first in "[A-Z0-9]{0,8}",
            others in proptest::collection::vec("[A-Z0-9]{0,8}", 1..5),
        ) {
            let mut properties = LanguageProperties::new();
            properties.put(&key, &first, 1).expect("valid key");
            for (idx, value) in others.iter().enumerate() {
                properties.put(&key, value, idx as u32 + 2).expect("valid key");
                let current = properties.get(&key).expect("valid key").expect("defined");
                prop_assert_eq!(&current.value, &first);
                prop_assert_eq!(current.line_number, 1);
            }
            prop_assert_eq!(properties.history(&key).len(), others.len() + 1);
        }
    }
}
