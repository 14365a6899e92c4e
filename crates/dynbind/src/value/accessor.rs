// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Located views over caller-owned storage.
//!
//! A [`Value`] borrows storage it does not own and tracks two flags:
//! whether the storage is addressable (reached through a pointer, or a
//! field/element of addressable storage) and whether it was reached
//! through an unexported field. Only addressable, exported, exclusively
//! borrowed values can be set; anything else fails with
//! [`BindError::NotSettable`].

use crate::error::{BindError, BindResult};
use crate::invoke::Callable;
use crate::types::{Kind, TypeDescriptor, TypeKind};
use crate::value::convert::convert;
use crate::value::{DynamicData, DynamicValue, FromValue, MapEntries};
use std::sync::Arc;

#[derive(Debug)]
enum Slot<'a> {
    Shared(&'a DynamicValue),
    Exclusive(&'a mut DynamicValue),
}

/// A located, typed view of a value.
#[derive(Debug)]
pub struct Value<'a> {
    desc: Arc<TypeDescriptor>,
    slot: Slot<'a>,
    addressable: bool,
    read_only: bool,
}

/// One step of a navigation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'p> {
    Field(&'p str),
    Index(usize),
}

/// Split `a.b[2].c` into segments.
pub fn parse_path(path: &str) -> BindResult<Vec<PathSegment<'_>>> {
    let invalid = |reason: &str| BindError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').ok_or_else(|| invalid("unclosed '['"))?;
            let index = after[..end]
                .parse::<usize>()
                .map_err(|_| invalid("index is not an unsigned integer"))?;
            segments.push(PathSegment::Index(index));
            rest = &after[end + 1..];
            continue;
        }

        let name = match rest.strip_prefix('.') {
            Some(after) if !segments.is_empty() => after,
            Some(_) => return Err(invalid("path starts with '.'")),
            None if segments.is_empty() => rest,
            None => return Err(invalid("expected '.' or '['")),
        };
        let end = name.find(&['.', '[', ']'][..]).unwrap_or(name.len());
        if end == 0 {
            return Err(invalid("empty field name"));
        }
        segments.push(PathSegment::Field(&name[..end]));
        rest = &name[end..];
    }
    Ok(segments)
}

impl<'a> Value<'a> {
    pub(crate) fn shared(desc: Arc<TypeDescriptor>, storage: &'a DynamicValue) -> Self {
        Self {
            desc,
            slot: Slot::Shared(storage),
            addressable: false,
            read_only: false,
        }
    }

    pub(crate) fn exclusive(desc: Arc<TypeDescriptor>, storage: &'a mut DynamicValue) -> Self {
        Self {
            desc,
            slot: Slot::Exclusive(storage),
            addressable: false,
            read_only: false,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.desc
    }

    pub fn kind(&self) -> Kind {
        self.desc.kind()
    }

    pub fn is_addressable(&self) -> bool {
        self.addressable
    }

    /// Addressable, not reached through an unexported field, and mutably borrowed.
    pub fn can_set(&self) -> bool {
        self.addressable && !self.read_only && matches!(self.slot, Slot::Exclusive(_))
    }

    pub fn storage(&self) -> &DynamicValue {
        match &self.slot {
            Slot::Shared(v) => *v,
            Slot::Exclusive(v) => &**v,
        }
    }

    /// Mutable storage, if the value is settable.
    pub fn storage_mut(&mut self) -> BindResult<&mut DynamicValue> {
        if !self.can_set() {
            return Err(BindError::NotSettable(self.desc.to_string()));
        }
        match &mut self.slot {
            Slot::Exclusive(v) => Ok(&mut **v),
            Slot::Shared(_) => Err(BindError::NotSettable(self.desc.to_string())),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.storage().is_nil()
    }

    /// Shorter-lived view of the same storage, keeping its flags.
    pub fn reborrow(&mut self) -> Value<'_> {
        let slot = match &mut self.slot {
            Slot::Shared(v) => Slot::Shared(*v),
            Slot::Exclusive(v) => Slot::Exclusive(&mut **v),
        };
        Value {
            desc: self.desc.clone(),
            slot,
            addressable: self.addressable,
            read_only: self.read_only,
        }
    }

    /// Copy out the value with its descriptor.
    pub fn to_data(&self) -> DynamicData {
        DynamicData::from_parts(self.desc.clone(), self.storage().clone())
    }

    /// Extract a Rust value.
    pub fn get<T: FromValue>(&self) -> BindResult<T> {
        T::from_dynamic(self.storage())
    }

    /// Dereference a pointer, or unwrap an interface.
    ///
    /// The target of a pointer is addressable; the content of an
    /// interface is not.
    pub fn elem(self) -> BindResult<Value<'a>> {
        match self.desc.type_kind() {
            TypeKind::Pointer(target) => {
                let target = target.clone();
                let slot = match self.slot {
                    Slot::Shared(DynamicValue::Pointer(Some(inner))) => Slot::Shared(&**inner),
                    Slot::Exclusive(DynamicValue::Pointer(Some(inner))) => {
                        Slot::Exclusive(&mut **inner)
                    }
                    _ => return Err(BindError::NilDereference),
                };
                Ok(Value {
                    desc: target,
                    slot,
                    addressable: true,
                    read_only: self.read_only,
                })
            }
            TypeKind::Interface { .. } => {
                let (desc, slot) = match self.slot {
                    Slot::Shared(DynamicValue::Interface(Some(data))) => {
                        (data.descriptor().clone(), Slot::Shared(data.value()))
                    }
                    Slot::Exclusive(DynamicValue::Interface(Some(data))) => {
                        let (desc, value) = data.parts_mut();
                        (desc, Slot::Exclusive(value))
                    }
                    _ => return Err(BindError::NilDereference),
                };
                Ok(Value {
                    desc,
                    slot,
                    addressable: false,
                    read_only: self.read_only,
                })
            }
            _ => Err(BindError::NonPointer(self.desc.kind())),
        }
    }

    /// Struct field by exact name.
    pub fn field(self, name: &str) -> BindResult<Value<'a>> {
        let fields = self
            .desc
            .fields()
            .ok_or(BindError::NonStruct(self.desc.kind()))?;
        let index = fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| BindError::FieldNotFound(name.to_string()))?;
        self.field_by_index(index)
    }

    /// Struct field by declaration index. Unexported fields are readable
    /// but never settable.
    pub fn field_by_index(self, index: usize) -> BindResult<Value<'a>> {
        let fields = self
            .desc
            .fields()
            .ok_or(BindError::NonStruct(self.desc.kind()))?;
        let field = fields.get(index).ok_or(BindError::IndexOutOfBounds {
            index,
            len: fields.len(),
        })?;
        let desc = field.type_desc.clone();
        let read_only = self.read_only || !field.is_exported();

        let slot = match self.slot {
            Slot::Shared(DynamicValue::Struct(values)) => values.get(index).map(Slot::Shared),
            Slot::Exclusive(DynamicValue::Struct(values)) => {
                values.get_mut(index).map(Slot::Exclusive)
            }
            Slot::Shared(other) => return Err(BindError::NonStruct(other.kind())),
            Slot::Exclusive(other) => return Err(BindError::NonStruct(other.kind())),
        };
        let slot = slot.ok_or_else(|| BindError::FieldNotFound(field.name.clone()))?;
        Ok(Value {
            desc,
            slot,
            addressable: self.addressable,
            read_only,
        })
    }

    /// Slice element. Elements are always addressable.
    pub fn index(self, index: usize) -> BindResult<Value<'a>> {
        let elem = match self.desc.type_kind() {
            TypeKind::Slice(elem) => elem.clone(),
            _ => return Err(BindError::NonSlice(self.desc.kind())),
        };
        let len = self.storage().as_slice().map_or(0, <[DynamicValue]>::len);
        let slot = match self.slot {
            Slot::Shared(DynamicValue::Slice(items)) => items.get(index).map(Slot::Shared),
            Slot::Exclusive(DynamicValue::Slice(items)) => items.get_mut(index).map(Slot::Exclusive),
            _ => None,
        };
        let slot = slot.ok_or(BindError::IndexOutOfBounds { index, len })?;
        Ok(Value {
            desc: elem,
            slot,
            addressable: true,
            read_only: self.read_only,
        })
    }

    /// Map element for `key`, converted to the key type first. Map
    /// elements are not addressable.
    pub fn map_index(self, key: &DynamicData) -> BindResult<Option<Value<'a>>> {
        let (key_desc, elem) = match self.desc.type_kind() {
            TypeKind::Map { key, elem } => (key.clone(), elem.clone()),
            _ => return Err(BindError::NonMap(self.desc.kind())),
        };
        let key = convert(key, &key_desc)?.into_value();
        let read_only = self.read_only;
        let slot = match self.slot {
            Slot::Shared(DynamicValue::Map(Some(entries))) => entries.get(&key).map(Slot::Shared),
            Slot::Exclusive(DynamicValue::Map(Some(entries))) => {
                entries.get_mut(&key).map(Slot::Exclusive)
            }
            _ => None,
        };
        Ok(slot.map(|slot| Value {
            desc: elem,
            slot,
            addressable: false,
            read_only,
        }))
    }

    /// Length of slices, maps and strings.
    pub fn len(&self) -> BindResult<usize> {
        match self.storage() {
            DynamicValue::Slice(items) => Ok(items.len()),
            DynamicValue::Map(entries) => Ok(entries.as_ref().map_or(0, MapEntries::len)),
            DynamicValue::String(s) => Ok(s.len()),
            other => Err(BindError::UnsupportedKind(other.kind())),
        }
    }

    pub fn is_empty(&self) -> BindResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Follow a path such as `Owner.Tags[2]`, dereferencing pointers on
    /// the way.
    pub fn lookup(self, path: &str) -> BindResult<Value<'a>> {
        let mut current = self;
        for segment in parse_path(path)? {
            while current.kind() == Kind::Pointer {
                current = current.elem()?;
            }
            current = match segment {
                PathSegment::Field(name) => current.field(name)?,
                PathSegment::Index(index) => current.index(index)?,
            };
        }
        Ok(current)
    }

    /// Assign `data`, converting it to this value's type.
    pub fn set(&mut self, data: DynamicData) -> BindResult<()> {
        if !self.can_set() {
            return Err(BindError::NotSettable(self.desc.to_string()));
        }
        let converted = convert(&data, &self.desc)?;
        *self.storage_mut()? = converted.into_value();
        Ok(())
    }

    /// `lookup(path)` then `set(data)`.
    pub fn set_path(&mut self, path: &str, data: DynamicData) -> BindResult<()> {
        self.reborrow().lookup(path)?.set(data)
    }

    /// Insert into a map, allocating it if nil. Overwrites an existing key.
    pub fn set_map_index(&mut self, key: DynamicData, value: DynamicData) -> BindResult<()> {
        let (key_desc, elem_desc) = match self.desc.type_kind() {
            TypeKind::Map { key, elem } => (key.clone(), elem.clone()),
            _ => return Err(BindError::NonMap(self.desc.kind())),
        };
        let key = convert(&key, &key_desc)?.into_value();
        let value = convert(&value, &elem_desc)?.into_value();
        match self.storage_mut()? {
            DynamicValue::Map(entries) => {
                entries.get_or_insert_with(MapEntries::new).insert(key, value);
                Ok(())
            }
            other => Err(BindError::NonMap(other.kind())),
        }
    }

    /// Swap in raw storage; the caller guarantees it fits the descriptor.
    pub(crate) fn replace(&mut self, value: DynamicValue) -> BindResult<DynamicValue> {
        debug_assert!(value.conforms_to(&self.desc));
        Ok(std::mem::replace(self.storage_mut()?, value))
    }

    /// The callable stored in a func value.
    pub fn callable(&self) -> BindResult<&Callable> {
        match self.storage() {
            DynamicValue::Func(Some(callable)) => Ok(callable),
            DynamicValue::Func(None) => Err(BindError::NilDereference),
            other => Err(BindError::NonFunc(other.kind())),
        }
    }

    /// Call the callable stored in a func value.
    pub fn call(&self, args: &[DynamicData]) -> BindResult<Vec<DynamicData>> {
        self.callable()?.call(args)
    }
}
