// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding error types.
//!
//! Every entry point returns the first failure it meets as a single
//! [`BindError`]. Decoders do not roll back entries applied before the
//! failing one.

use crate::types::Kind;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type BindResult<T> = Result<T, BindError>;

/// Errors produced by descriptors, accessors, the invoker and the decoder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    // Structural
    #[error("expected a pointer, found {0}")]
    NonPointer(Kind),

    #[error("expected a slice, found {0}")]
    NonSlice(Kind),

    #[error("expected a struct, found {0}")]
    NonStruct(Kind),

    #[error("expected a map, found {0}")]
    NonMap(Kind),

    #[error("expected a func, found {0}")]
    NonFunc(Kind),

    #[error("target pointer is nil")]
    NilPointer,

    #[error("dereference of nil value")]
    NilDereference,

    // Access
    #[error("value of type {0} is not settable")]
    NotSettable(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    // Shape / type
    #[error("argument {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: Kind,
        found: Kind,
    },

    #[error("cannot assign {found} to {expected}")]
    NotAssignable { expected: String, found: String },

    #[error("map key of kind {found} is not convertible to {expected}")]
    KeyTypeMismatch { expected: Kind, found: Kind },

    #[error("value of kind {found} is not assignable to {expected}")]
    ValueTypeMismatch { expected: Kind, found: Kind },

    #[error("slice element kind {0} is neither string nor interface {{}}")]
    ElementTypeMismatch(Kind),

    #[error("wrong argument count: expected {expected}, got {found} (variadic: {variadic})")]
    ArityMismatch {
        expected: usize,
        found: usize,
        variadic: bool,
    },

    #[error("invalid result shape: {0}")]
    InvalidResultShape(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    // Numeric
    #[error("value overflows {0}")]
    Overflow(Kind),

    #[error("unsupported target kind: {0}")]
    UnsupportedKind(Kind),

    // Syntax
    #[error("parse error in {input:?}: {reason}")]
    ParseError { input: String, reason: String },
}

impl BindError {
    /// Build a [`BindError::ParseError`] for `input`.
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::ParseError {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_kind() {
        assert_eq!(
            BindError::Overflow(Kind::I8).to_string(),
            "value overflows int8"
        );
        assert_eq!(
            BindError::ElementTypeMismatch(Kind::I32).to_string(),
            "slice element kind int32 is neither string nor interface {}"
        );
    }

    #[test]
    fn test_type_mismatch_names_index() {
        let err = BindError::TypeMismatch {
            index: 1,
            expected: Kind::I64,
            found: Kind::String,
        };
        assert_eq!(err.to_string(), "argument 1: expected int64, found string");
    }
}
