// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fill slices, scalars, maps and structs from textual input.
//!
//! Every entry point takes a view of a pointer and writes through it.
//! Entries are applied left to right; on failure the entries already
//! applied stay applied.

mod entries;

pub use entries::{split_entries, Entries, Entry};

use crate::config::{BindConfig, FieldPolicy};
use crate::error::{BindError, BindResult};
use crate::types::{Conversion, Kind, TypeDescriptor, TypeKind};
use crate::value::{convert_number, DynamicData, DynamicValue, MapEntries, Number, Value};

/// Decoder over a [`BindConfig`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: BindConfig,
}

/// Dereference a non-nil pointer target.
fn pointee(target: Value<'_>) -> BindResult<Value<'_>> {
    if target.kind() != Kind::Pointer {
        return Err(BindError::NonPointer(target.kind()));
    }
    if target.is_nil() {
        return Err(BindError::NilPointer);
    }
    target.elem()
}

/// Raw text as a value of `desc`: strings as-is, empty interfaces boxed.
fn text_value(text: &str, desc: &TypeDescriptor) -> Option<DynamicValue> {
    if desc.kind() == Kind::String {
        Some(DynamicValue::String(text.to_string()))
    } else if desc.accepts_any() {
        Some(DynamicValue::Interface(Some(Box::new(DynamicData::string(text)))))
    } else {
        None
    }
}

fn map_entries<'v>(map: &'v mut Value<'_>) -> BindResult<&'v mut MapEntries> {
    match map.storage_mut()? {
        DynamicValue::Map(entries) => Ok(entries.get_or_insert_with(|| {
            log::trace!("[decode] allocating map");
            MapEntries::new()
        })),
        other => Err(BindError::NonMap(other.kind())),
    }
}

impl Decoder {
    pub fn new(config: BindConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Replace the target slice with one element per literal.
    ///
    /// The element kind must be string or the empty interface.
    pub fn fill_slice(&self, target: Value<'_>, literals: &[&str]) -> BindResult<()> {
        let mut slice = pointee(target)?;
        let elem = match slice.descriptor().type_kind() {
            TypeKind::Slice(elem) => elem.clone(),
            _ => return Err(BindError::NonSlice(slice.kind())),
        };
        if elem.kind() != Kind::String && !elem.accepts_any() {
            return Err(BindError::ElementTypeMismatch(elem.kind()));
        }
        let items = literals
            .iter()
            .filter_map(|lit| text_value(lit, &elem))
            .collect();
        slice.replace(DynamicValue::Slice(items))?;
        Ok(())
    }

    /// Write a number into a numeric target, checking it fits.
    pub fn fill_scalar(&self, target: Value<'_>, number: impl Into<Number>) -> BindResult<()> {
        let mut scalar = pointee(target)?;
        let value = convert_number(number.into(), scalar.kind())?;
        scalar.replace(value)?;
        Ok(())
    }

    /// Decode `key=value` entries with integer keys into a map.
    ///
    /// A nil map is allocated on the first entry. Existing keys are
    /// overwritten.
    pub fn decode_map(&self, text: &str, target: Value<'_>) -> BindResult<()> {
        let mut map = pointee(target)?;
        let (key_desc, elem_desc) = match map.descriptor().type_kind() {
            TypeKind::Map { key, elem } => (key.clone(), elem.clone()),
            _ => return Err(BindError::NonMap(map.kind())),
        };

        for entry in split_entries(text, &self.config) {
            let entry = entry?;
            let key = entry
                .key
                .parse::<i64>()
                .map_err(|_| BindError::parse(entry.key, "map key is not an integer"))?;
            map_entries(&mut map)?;

            let key = match Kind::I64.conversion_to(key_desc.kind()) {
                Conversion::Identity | Conversion::Numeric => {
                    convert_number(Number::Int(key), key_desc.kind())?
                }
                Conversion::Interface if key_desc.accepts_any() => {
                    DynamicValue::Interface(Some(Box::new(DynamicData::of(key))))
                }
                Conversion::Interface | Conversion::Inconvertible => {
                    return Err(BindError::KeyTypeMismatch {
                        expected: key_desc.kind(),
                        found: Kind::I64,
                    })
                }
            };
            let value = text_value(entry.value, &elem_desc).ok_or(BindError::ValueTypeMismatch {
                expected: elem_desc.kind(),
                found: Kind::String,
            })?;

            log::trace!("[decode] map entry {}={}", entry.key, entry.value);
            map_entries(&mut map)?.insert(key, value);
        }
        Ok(())
    }

    /// Decode `Field=value` entries into a struct's string fields.
    ///
    /// Under [`FieldPolicy::Permissive`] entries naming a missing,
    /// unexported or non-string field are skipped; under
    /// [`FieldPolicy::Strict`] they fail.
    pub fn decode_struct(&self, text: &str, target: Value<'_>) -> BindResult<()> {
        let mut record = pointee(target)?;
        if record.descriptor().fields().is_none() {
            return Err(BindError::NonStruct(record.kind()));
        }
        let strict = self.config.field_policy == FieldPolicy::Strict;

        for entry in split_entries(text, &self.config) {
            let entry = entry?;
            let Some(index) = record.descriptor().field_index(entry.key) else {
                if strict {
                    return Err(BindError::UnknownField(entry.key.to_string()));
                }
                log::debug!("[decode] skipping {}: no such field", entry.key);
                continue;
            };

            let mut field = record.reborrow().field_by_index(index)?;
            if !field.can_set() {
                if strict {
                    return Err(BindError::NotSettable(format!("field {}", entry.key)));
                }
                log::debug!("[decode] skipping {}: not settable", entry.key);
                continue;
            }
            if field.kind() != Kind::String {
                if strict {
                    return Err(BindError::ValueTypeMismatch {
                        expected: field.kind(),
                        found: Kind::String,
                    });
                }
                log::debug!("[decode] skipping {}: field is {}", entry.key, field.kind());
                continue;
            }
            field.replace(DynamicValue::String(entry.value.to_string()))?;
        }
        Ok(())
    }
}

/// [`Decoder::fill_slice`] with the default configuration.
pub fn fill_slice(target: Value<'_>, literals: &[&str]) -> BindResult<()> {
    Decoder::default().fill_slice(target, literals)
}

/// [`Decoder::fill_scalar`] with the default configuration.
pub fn fill_scalar(target: Value<'_>, number: impl Into<Number>) -> BindResult<()> {
    Decoder::default().fill_scalar(target, number)
}

/// [`Decoder::decode_map`] with the default configuration.
pub fn decode_map(text: &str, target: Value<'_>) -> BindResult<()> {
    Decoder::default().decode_map(text, target)
}

/// [`Decoder::decode_struct`] with the default configuration.
pub fn decode_struct(text: &str, target: Value<'_>) -> BindResult<()> {
    Decoder::default().decode_struct(text, target)
}
