// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What `decode_struct` does with entries it cannot assign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Skip unknown, unexported and non-string fields.
    #[default]
    Permissive,
    /// Fail on the first entry that cannot be assigned.
    Strict,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Struct entry handling.
    #[serde(default)]
    pub field_policy: FieldPolicy,

    /// Separator between entries.
    #[serde(default = "default_entry_separator")]
    pub entry_separator: char,

    /// Separator between key and value.
    #[serde(default = "default_pair_separator")]
    pub pair_separator: char,

    /// Trim whitespace around keys and values.
    #[serde(default)]
    pub trim_entries: bool,
}

fn default_entry_separator() -> char {
    ','
}

fn default_pair_separator() -> char {
    '='
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            field_policy: FieldPolicy::Permissive,
            entry_separator: default_entry_separator(),
            pair_separator: default_pair_separator(),
            trim_entries: false,
        }
    }
}

impl BindConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Strict configuration with default separators.
    pub fn strict() -> Self {
        Self {
            field_policy: FieldPolicy::Strict,
            ..Self::default()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_separator == self.pair_separator {
            return Err(ConfigError::Invalid(format!(
                "entry and pair separators are both {:?}",
                self.entry_separator
            )));
        }
        for (name, sep) in [
            ("entry_separator", self.entry_separator),
            ("pair_separator", self.pair_separator),
        ] {
            if sep.is_whitespace() {
                return Err(ConfigError::Invalid(format!(
                    "{} must not be whitespace",
                    name
                )));
            }
        }
        Ok(())
    }
}
