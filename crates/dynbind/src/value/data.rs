// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Caller-owned storage: dynamic values and typed data containers.

use crate::error::{BindError, BindResult};
use crate::invoke::Callable;
use crate::types::{describe_type, Kind, PrimitiveKind, Reflect, TypeDescriptor, TypeKind};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A dynamic value laid out according to some [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),

    // Composites
    Slice(Vec<DynamicValue>),
    /// `None` is an unallocated map.
    Map(Option<MapEntries>),
    /// Field values in declaration order.
    Struct(Vec<DynamicValue>),
    /// `None` is a nil pointer.
    Pointer(Option<Box<DynamicValue>>),
    /// Boxed value with its dynamic type; `None` is a nil interface.
    Interface(Option<Box<DynamicData>>),
    Func(Option<Callable>),
}

impl DynamicValue {
    /// Zero value for a type.
    pub fn zero(desc: &TypeDescriptor) -> Self {
        match desc.type_kind() {
            TypeKind::Primitive(p) => Self::zero_primitive(*p),
            TypeKind::Slice(_) => Self::Slice(Vec::new()),
            TypeKind::Map { .. } => Self::Map(None),
            TypeKind::Struct(fields) => {
                Self::Struct(fields.iter().map(|f| Self::zero(&f.type_desc)).collect())
            }
            TypeKind::Pointer(_) => Self::Pointer(None),
            TypeKind::Interface { .. } => Self::Interface(None),
            TypeKind::Func(_) => Self::Func(None),
        }
    }

    fn zero_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Bool(false),
            PrimitiveKind::I8 => Self::I8(0),
            PrimitiveKind::I16 => Self::I16(0),
            PrimitiveKind::I32 => Self::I32(0),
            PrimitiveKind::I64 => Self::I64(0),
            PrimitiveKind::U8 => Self::U8(0),
            PrimitiveKind::U16 => Self::U16(0),
            PrimitiveKind::U32 => Self::U32(0),
            PrimitiveKind::U64 => Self::U64(0),
            PrimitiveKind::F32 => Self::F32(0.0),
            PrimitiveKind::F64 => Self::F64(0.0),
            PrimitiveKind::String => Self::String(String::new()),
        }
    }

    /// Kind of the stored value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I8(_) => Kind::I8,
            Self::I16(_) => Kind::I16,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::U8(_) => Kind::U8,
            Self::U16(_) => Kind::U16,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::String(_) => Kind::String,
            Self::Slice(_) => Kind::Slice,
            Self::Map(_) => Kind::Map,
            Self::Struct(_) => Kind::Struct,
            Self::Pointer(_) => Kind::Pointer,
            Self::Interface(_) => Kind::Interface,
            Self::Func(_) => Kind::Func,
        }
    }

    /// True for nil maps, pointers, interfaces and funcs.
    pub fn is_nil(&self) -> bool {
        matches!(
            self,
            Self::Map(None) | Self::Pointer(None) | Self::Interface(None) | Self::Func(None)
        )
    }

    /// Check that this value is laid out as `desc` describes.
    pub fn conforms_to(&self, desc: &TypeDescriptor) -> bool {
        match (desc.type_kind(), self) {
            (TypeKind::Primitive(p), value) => value.kind() == p.kind(),
            (TypeKind::Slice(elem), Self::Slice(items)) => {
                items.iter().all(|item| item.conforms_to(elem))
            }
            (TypeKind::Map { key, elem }, Self::Map(entries)) => entries.as_ref().map_or(true, |m| {
                m.iter()
                    .all(|(k, v)| k.conforms_to(key) && v.conforms_to(elem))
            }),
            (TypeKind::Struct(fields), Self::Struct(values)) => {
                fields.len() == values.len()
                    && fields
                        .iter()
                        .zip(values)
                        .all(|(f, v)| v.conforms_to(&f.type_desc))
            }
            (TypeKind::Pointer(elem), Self::Pointer(target)) => {
                target.as_deref().map_or(true, |t| t.conforms_to(elem))
            }
            (TypeKind::Interface { .. }, Self::Interface(_)) => true,
            (TypeKind::Func(sig), Self::Func(callable)) => {
                callable.as_ref().map_or(true, |c| c.signature() == sig)
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed integer, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned integer, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Slice(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of an allocated map.
    pub fn as_map(&self) -> Option<&MapEntries> {
        match self {
            Self::Map(entries) => entries.as_ref(),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Struct(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::Slice(items) | Self::Struct(items) => {
                let (open, close) = if matches!(self, Self::Slice(_)) {
                    ('[', ']')
                } else {
                    ('{', '}')
                };
                write!(f, "{}", open)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "{}", close)
            }
            Self::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().flat_map(MapEntries::iter).enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("]")
            }
            Self::Pointer(Some(target)) => write!(f, "&{}", target),
            Self::Interface(Some(data)) => write!(f, "{}", data.value()),
            Self::Func(Some(callable)) => write!(f, "func {}", callable.name()),
            Self::Pointer(None) | Self::Interface(None) | Self::Func(None) => f.write_str("<nil>"),
        }
    }
}

/// Map storage. Keeps insertion order; key equality decides overwrites.
#[derive(Debug, Clone, Default)]
pub struct MapEntries {
    entries: Vec<(DynamicValue, DynamicValue)>,
}

impl MapEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: DynamicValue, value: DynamicValue) -> Option<DynamicValue> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &DynamicValue) -> Option<&DynamicValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &DynamicValue) -> Option<&mut DynamicValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &DynamicValue) -> Option<DynamicValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DynamicValue, &DynamicValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for MapEntries {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(DynamicValue, DynamicValue)> for MapEntries {
    fn from_iter<I: IntoIterator<Item = (DynamicValue, DynamicValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A value together with its type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicData {
    descriptor: Arc<TypeDescriptor>,
    value: DynamicValue,
}

impl DynamicData {
    /// Zero value of `descriptor`.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value: DynamicValue::zero(descriptor),
        }
    }

    /// Wrap an existing value, checking it is laid out as `descriptor` says.
    pub fn from_value(descriptor: &Arc<TypeDescriptor>, value: DynamicValue) -> BindResult<Self> {
        if !value.conforms_to(descriptor) {
            return Err(BindError::NotAssignable {
                expected: descriptor.to_string(),
                found: value.kind().to_string(),
            });
        }
        Ok(Self::from_parts(descriptor.clone(), value))
    }

    pub(crate) fn from_parts(descriptor: Arc<TypeDescriptor>, value: DynamicValue) -> Self {
        Self { descriptor, value }
    }

    pub(crate) fn parts_mut(&mut self) -> (Arc<TypeDescriptor>, &mut DynamicValue) {
        (self.descriptor.clone(), &mut self.value)
    }

    /// Typed constructor for Rust values.
    pub fn of<T: IntoValue>(value: T) -> Self {
        Self::from_parts(describe_type::<T>(), value.into_dynamic())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::of::<String>(value.into())
    }

    /// Pointer to `target`, taking ownership of its storage.
    pub fn pointer_to(target: DynamicData) -> Self {
        Self::from_parts(
            TypeDescriptor::pointer(target.descriptor),
            DynamicValue::Pointer(Some(Box::new(target.value))),
        )
    }

    /// Nil pointer to `elem`.
    pub fn nil_pointer(elem: Arc<TypeDescriptor>) -> Self {
        Self::from_parts(TypeDescriptor::pointer(elem), DynamicValue::Pointer(None))
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn kind(&self) -> Kind {
        self.descriptor.kind()
    }

    /// Get the underlying value.
    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    /// Into inner value.
    pub fn into_value(self) -> DynamicValue {
        self.value
    }

    pub fn into_parts(self) -> (Arc<TypeDescriptor>, DynamicValue) {
        (self.descriptor, self.value)
    }

    /// Extract a Rust value.
    pub fn get<T: FromValue>(&self) -> BindResult<T> {
        T::from_dynamic(&self.value)
    }

    /// Read-only, non-addressable view.
    pub fn reflect(&self) -> Value<'_> {
        Value::shared(self.descriptor.clone(), &self.value)
    }

    /// Mutable but non-addressable view; dereference a pointer to reach
    /// settable storage.
    pub fn reflect_mut(&mut self) -> Value<'_> {
        Value::exclusive(self.descriptor.clone(), &mut self.value)
    }
}

impl fmt::Display for DynamicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Trait for converting from DynamicValue.
pub trait FromValue: Reflect + Sized {
    fn from_dynamic(value: &DynamicValue) -> BindResult<Self>;
}

/// Trait for converting to DynamicValue.
pub trait IntoValue: Reflect {
    fn into_dynamic(self) -> DynamicValue;
}

fn mismatch<T: Reflect>(value: &DynamicValue) -> BindError {
    BindError::NotAssignable {
        expected: describe_type::<T>().to_string(),
        found: value.kind().to_string(),
    }
}

macro_rules! impl_primitive_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_dynamic(value: &DynamicValue) -> BindResult<Self> {
                    match value {
                        DynamicValue::$variant(v) => Ok(v.clone()),
                        other => Err(mismatch::<$ty>(other)),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_dynamic(self) -> DynamicValue {
                    DynamicValue::$variant(self)
                }
            }
        )*
    };
}

impl_primitive_value!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl<T: FromValue> FromValue for Vec<T> {
    fn from_dynamic(value: &DynamicValue) -> BindResult<Self> {
        match value {
            DynamicValue::Slice(items) => items.iter().map(T::from_dynamic).collect(),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::Slice(self.into_iter().map(IntoValue::into_dynamic).collect())
    }
}

impl<K, V> FromValue for HashMap<K, V>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
{
    fn from_dynamic(value: &DynamicValue) -> BindResult<Self> {
        match value {
            DynamicValue::Map(None) => Ok(HashMap::new()),
            DynamicValue::Map(Some(entries)) => entries
                .iter()
                .map(|(k, v)| Ok((K::from_dynamic(k)?, V::from_dynamic(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::Map(Some(
            self.into_iter()
                .map(|(k, v)| (k.into_dynamic(), v.into_dynamic()))
                .collect(),
        ))
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_dynamic(value: &DynamicValue) -> BindResult<Self> {
        match value {
            DynamicValue::Pointer(Some(target)) => Ok(Box::new(T::from_dynamic(target)?)),
            DynamicValue::Pointer(None) => Err(BindError::NilDereference),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::Pointer(Some(Box::new((*self).into_dynamic())))
    }
}

impl Reflect for DynamicData {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::any()
    }
}

impl FromValue for DynamicData {
    fn from_dynamic(value: &DynamicValue) -> BindResult<Self> {
        match value {
            DynamicValue::Interface(Some(data)) => Ok((**data).clone()),
            DynamicValue::Interface(None) => Err(BindError::NilDereference),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl IntoValue for DynamicData {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::Interface(Some(Box::new(self)))
    }
}
