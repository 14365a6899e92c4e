// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value conversion driven by the kind table, with overflow checks.

use crate::error::{BindError, BindResult};
use crate::types::{Conversion, Kind, TypeDescriptor};
use crate::value::{DynamicData, DynamicValue};
use std::str::FromStr;
use std::sync::Arc;

/// A numeric literal before it is narrowed into a target kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Number {
    /// Parse a decimal literal: signed, then unsigned, then float.
    pub fn parse(text: &str) -> BindResult<Self> {
        if let Ok(v) = text.parse::<i64>() {
            return Ok(Self::Int(v));
        }
        if let Ok(v) = text.parse::<u64>() {
            return Ok(Self::Uint(v));
        }
        text.parse::<f64>()
            .map(Self::Float)
            .map_err(|_| BindError::parse(text, "not a numeric literal"))
    }

    /// Numeric payload of a stored value.
    pub fn from_value(value: &DynamicValue) -> Option<Self> {
        value
            .as_i64()
            .map(Self::Int)
            .or_else(|| value.as_u64().map(Self::Uint))
            .or_else(|| value.as_f64().map(Self::Float))
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Uint(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl FromStr for Number {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! impl_number_from {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$wide>::from(v))
                }
            }
        )*
    };
}

impl_number_from!(Int as i64: i8, i16, i32, i64);
impl_number_from!(Uint as u64: u8, u16, u32, u64);
impl_number_from!(Float as f64: f32, f64);

// 2^63 and 2^64, exactly representable.
const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const U64_END_F: f64 = 18_446_744_073_709_551_616.0;

/// Narrow into an integer type; floats truncate toward zero.
fn narrow<T>(number: Number, kind: Kind) -> BindResult<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match number {
        Number::Int(v) => <T as TryFrom<i64>>::try_from(v).map_err(|_| BindError::Overflow(kind)),
        Number::Uint(v) => <T as TryFrom<u64>>::try_from(v).map_err(|_| BindError::Overflow(kind)),
        Number::Float(v) => {
            let t = v.trunc();
            if !t.is_finite() || t < I64_MIN_F || t >= U64_END_F {
                Err(BindError::Overflow(kind))
            } else if t < 0.0 {
                <T as TryFrom<i64>>::try_from(t as i64).map_err(|_| BindError::Overflow(kind))
            } else {
                <T as TryFrom<u64>>::try_from(t as u64).map_err(|_| BindError::Overflow(kind))
            }
        }
    }
}

fn narrow_f32(number: Number) -> BindResult<f32> {
    match number {
        Number::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
            Err(BindError::Overflow(Kind::F32))
        }
        other => Ok(other.as_f64() as f32),
    }
}

/// Convert a number into a value of numeric kind `target`.
///
/// Fails with [`BindError::Overflow`] when the number does not fit the
/// target's width, and [`BindError::UnsupportedKind`] for non-numeric targets.
pub fn convert_number(number: Number, target: Kind) -> BindResult<DynamicValue> {
    Ok(match target {
        Kind::I8 => DynamicValue::I8(narrow(number, target)?),
        Kind::I16 => DynamicValue::I16(narrow(number, target)?),
        Kind::I32 => DynamicValue::I32(narrow(number, target)?),
        Kind::I64 => DynamicValue::I64(narrow(number, target)?),
        Kind::U8 => DynamicValue::U8(narrow(number, target)?),
        Kind::U16 => DynamicValue::U16(narrow(number, target)?),
        Kind::U32 => DynamicValue::U32(narrow(number, target)?),
        Kind::U64 => DynamicValue::U64(narrow(number, target)?),
        Kind::F32 => DynamicValue::F32(narrow_f32(number)?),
        Kind::F64 => DynamicValue::F64(number.as_f64()),
        other => return Err(BindError::UnsupportedKind(other)),
    })
}

/// Kind-level assignability: identical kinds, numeric pairs, or an
/// interface target with no methods.
pub fn can_assign(source: Kind, target: &TypeDescriptor) -> bool {
    match source.conversion_to(target.kind()) {
        Conversion::Identity | Conversion::Numeric => true,
        Conversion::Interface => target.accepts_any(),
        Conversion::Inconvertible => false,
    }
}

fn not_assignable(data: &DynamicData, target: &TypeDescriptor) -> BindError {
    BindError::NotAssignable {
        expected: target.to_string(),
        found: data.descriptor().to_string(),
    }
}

/// Convert `data` into a value of type `target`.
///
/// Composite values convert only between identical shapes, or when one
/// side is unnamed and the storage fits the other.
pub fn convert(data: &DynamicData, target: &Arc<TypeDescriptor>) -> BindResult<DynamicData> {
    let source = data.descriptor();
    match source.kind().conversion_to(target.kind()) {
        Conversion::Identity => {
            let compatible = source.kind().is_scalar()
                || source == target
                || ((source.name().is_empty() || target.name().is_empty())
                    && data.value().conforms_to(target));
            if compatible {
                Ok(DynamicData::from_parts(target.clone(), data.value().clone()))
            } else {
                Err(not_assignable(data, target))
            }
        }
        Conversion::Numeric => {
            let number = Number::from_value(data.value()).ok_or_else(|| not_assignable(data, target))?;
            let value = convert_number(number, target.kind())?;
            Ok(DynamicData::from_parts(target.clone(), value))
        }
        Conversion::Interface if target.accepts_any() => Ok(DynamicData::from_parts(
            target.clone(),
            DynamicValue::Interface(Some(Box::new(data.clone()))),
        )),
        Conversion::Interface | Conversion::Inconvertible => Err(not_assignable(data, target)),
    }
}
