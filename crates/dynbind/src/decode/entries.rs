// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `key=value,key=value` splitting.
//!
//! Values are taken verbatim up to the next entry separator; there is no
//! escaping, so a value can never contain the entry separator. A value may
//! contain the pair separator, since only the first one splits the entry.

use crate::config::BindConfig;
use crate::error::{BindError, BindResult};
use std::str::Split;

/// One `key=value` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'t> {
    pub key: &'t str,
    pub value: &'t str,
}

/// Iterator over the entries of a text.
#[derive(Debug, Clone)]
pub struct Entries<'t> {
    chunks: Option<Split<'t, char>>,
    pair_separator: char,
    trim: bool,
}

/// Split `text` into entries. Empty text has no entries.
pub fn split_entries<'t>(text: &'t str, config: &BindConfig) -> Entries<'t> {
    let empty = if config.trim_entries {
        text.trim().is_empty()
    } else {
        text.is_empty()
    };
    Entries {
        chunks: (!empty).then(|| text.split(config.entry_separator)),
        pair_separator: config.pair_separator,
        trim: config.trim_entries,
    }
}

impl<'t> Entries<'t> {
    fn parse(&self, chunk: &'t str) -> BindResult<Entry<'t>> {
        let (key, value) = chunk
            .split_once(self.pair_separator)
            .ok_or_else(|| BindError::parse(chunk, "malformed entry"))?;
        let (key, value) = if self.trim {
            (key.trim(), value.trim())
        } else {
            (key, value)
        };
        if key.is_empty() {
            return Err(BindError::parse(chunk, "empty key"));
        }
        Ok(Entry { key, value })
    }
}

impl<'t> Iterator for Entries<'t> {
    type Item = BindResult<Entry<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.as_mut()?.next()?;
        Some(self.parse(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, config: &BindConfig) -> BindResult<Vec<(String, String)>> {
        split_entries(text, config)
            .map(|e| e.map(|e| (e.key.to_string(), e.value.to_string())))
            .collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_split() {
        let config = BindConfig::default();
        assert_eq!(
            collect("1=foo,2=bar", &config).ok(),
            Some(vec![pair("1", "foo"), pair("2", "bar")])
        );
        assert_eq!(collect("", &config).ok(), Some(vec![]));
        assert_eq!(collect("k=", &config).ok(), Some(vec![pair("k", "")]));
        assert_eq!(collect("k=a=b", &config).ok(), Some(vec![pair("k", "a=b")]));
    }

    #[test]
    fn test_whitespace_is_verbatim_by_default() {
        let config = BindConfig::default();
        assert_eq!(
            collect(" a = b ", &config).ok(),
            Some(vec![pair(" a ", " b ")])
        );
        let trimmed = BindConfig {
            trim_entries: true,
            ..BindConfig::default()
        };
        assert_eq!(
            collect(" a = b , c=d ", &trimmed).ok(),
            Some(vec![pair("a", "b"), pair("c", "d")])
        );
        assert_eq!(collect("   ", &trimmed).ok(), Some(vec![]));
    }

    #[test]
    fn test_malformed() {
        let config = BindConfig::default();
        for bad in ["novalue", "1=a,,2=b", "=x", "1=a,"] {
            assert!(
                matches!(collect(bad, &config), Err(BindError::ParseError { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_custom_separators() {
        let config = BindConfig {
            entry_separator: ';',
            pair_separator: ':',
            ..BindConfig::default()
        };
        assert_eq!(
            collect("a:1,2;b:3", &config).ok(),
            Some(vec![pair("a", "1,2"), pair("b", "3")])
        );
    }
}
