// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Indexer settings loaded from a TOML file.
//!
//! ```toml
//! default_dialect = "mads"
//! property_namespace = "com.wudsn.ide.lng"
//!
//! [dialects.dasm]
//! extra_equate_tokens = ["SETSTR"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::core::error::IndexError;
use crate::dialect::Dialect;
use crate::properties::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectConfig {
    /// Instruction tokens treated as equates on top of the dialect's own.
    pub extra_equate_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    pub default_dialect: Option<String>,
    pub property_namespace: String,
    pub dialects: BTreeMap<String, DialectConfig>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            default_dialect: None,
            property_namespace: DEFAULT_NAMESPACE.to_string(),
            dialects: BTreeMap::new(),
        }
    }
}

impl IndexerConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, IndexError> {
        let text = fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_toml(path, &text)?;
        debug!("loaded indexer config from '{}'", path.display());
        Ok(config)
    }

    pub fn parse_toml(path: &Path, text: &str) -> Result<Self, IndexError> {
        let config: Self = toml::from_str(text).map_err(|source| IndexError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject dialect ids and namespaces that would only fail later.
    pub fn validate(&self) -> Result<(), IndexError> {
        self.default_dialect()?;
        for id in self.dialects.keys() {
            Dialect::from_id(id)?;
        }
        let namespace = self.property_namespace.trim();
        if namespace.is_empty() || namespace.contains(char::is_whitespace) {
            return Err(IndexError::invalid_argument(
                "property_namespace",
                "must be a non-empty dotted name",
            ));
        }
        Ok(())
    }

    pub fn default_dialect(&self) -> Result<Option<Dialect>, IndexError> {
        self.default_dialect
            .as_deref()
            .map(Dialect::from_id)
            .transpose()
    }

    /// Extra equate tokens configured for `dialect`, under any of its ids.
    pub fn extra_equate_tokens(&self, dialect: Dialect) -> Vec<String> {
        self.dialects
            .iter()
            .filter(|(id, _)| Dialect::from_id(id).is_ok_and(|configured| configured == dialect))
            .flat_map(|(_, settings)| settings.extra_equate_tokens.iter().cloned())
            .collect()
    }

    pub fn property_namespace(&self) -> &str {
        self.property_namespace.trim()
    }
}
