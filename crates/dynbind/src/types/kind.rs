// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Closed kind taxonomy and the kind-level conversion table.

use std::fmt;

/// The closed set of kinds a [`TypeDescriptor`](crate::TypeDescriptor) can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Slice,
    Map,
    Struct,
    Pointer,
    Interface,
    Func,
}

/// How a value of one kind becomes a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same kind, the value is used as-is.
    Identity,
    /// Numeric conversion, guarded by an overflow check on the value.
    Numeric,
    /// The value is boxed into an interface.
    Interface,
    /// No conversion exists.
    Inconvertible,
}

impl Conversion {
    /// True unless the pair is inconvertible.
    pub fn is_possible(self) -> bool {
        !matches!(self, Self::Inconvertible)
    }
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 18] = [
        Kind::Bool,
        Kind::I8,
        Kind::I16,
        Kind::I32,
        Kind::I64,
        Kind::U8,
        Kind::U16,
        Kind::U32,
        Kind::U64,
        Kind::F32,
        Kind::F64,
        Kind::String,
        Kind::Slice,
        Kind::Map,
        Kind::Struct,
        Kind::Pointer,
        Kind::Interface,
        Kind::Func,
    ];

    /// Lower-case kind name, as used in type signatures.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::String => "string",
            Self::Slice => "slice",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Pointer => "ptr",
            Self::Interface => "interface",
            Self::Func => "func",
        }
    }

    pub fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int() || self.is_float()
    }

    /// Bool, numeric and string kinds.
    pub fn is_scalar(self) -> bool {
        self.is_numeric() || matches!(self, Self::Bool | Self::String)
    }

    /// Declared bit width of numeric kinds.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            Self::I8 | Self::U8 => Some(8),
            Self::I16 | Self::U16 => Some(16),
            Self::I32 | Self::U32 | Self::F32 => Some(32),
            Self::I64 | Self::U64 | Self::F64 => Some(64),
            _ => None,
        }
    }

    /// Look up the conversion from `self` to `target`.
    ///
    /// Total over every pair of kinds. Integers never convert to `Bool`, and
    /// nothing converts to or from `String` except `String` itself. Whether
    /// an `Interface` target really accepts the value depends on its method
    /// count, which is checked at the descriptor level.
    pub fn conversion_to(self, target: Kind) -> Conversion {
        if self == target {
            Conversion::Identity
        } else if target == Kind::Interface {
            Conversion::Interface
        } else if self.is_numeric() && target.is_numeric() {
            Conversion::Numeric
        } else {
            Conversion::Inconvertible
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
