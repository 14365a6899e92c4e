// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflective data binding
//!
//! Describe values at runtime, read and write them through checked views,
//! call functions with dynamic arguments, and decode `key=value` text into
//! slices, maps and structs whose types are only known at runtime.
//!
//! # Features
//!
//! - **TypeDescriptor**: Closed kind taxonomy with fields, tags, element and key types
//! - **Value**: Located views that honour addressability and field visibility
//! - **Callable**: One calling convention for native and synthesized functions
//! - **Decoder**: Text decoding with conversion and overflow checks
//!
//! # Example
//!
//! ```rust
//! use dynbind::{decode_map, evaluate, DynamicData, FunctionRegistry, TypeDescriptor, PrimitiveKind};
//! use std::collections::HashMap;
//!
//! let desc = TypeDescriptor::map(
//!     TypeDescriptor::primitive(PrimitiveKind::I64),
//!     TypeDescriptor::string(),
//! );
//! let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
//! decode_map("1=foo,2=bar", target.reflect_mut()).unwrap();
//! let map: Box<HashMap<i64, String>> = target.get().unwrap();
//! assert_eq!(map[&2], "bar");
//!
//! let registry = FunctionRegistry::with_builtins();
//! let out = evaluate(r#"{{ "ab" 2 | repeat }}"#, &registry).unwrap();
//! assert_eq!(out, "abab");
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod invoke;
pub mod types;
pub mod value;

pub use config::{BindConfig, ConfigError, FieldPolicy};
pub use decode::{decode_map, decode_struct, fill_scalar, fill_slice, Decoder};
pub use error::{BindError, BindResult};
pub use invoke::{evaluate, make_func, Callable, Expression, FunctionRegistry, Literal};
pub use types::{
    describe, describe_type, parse_tags, Conversion, FieldDescriptor, FuncBuilder,
    FuncDescriptor, Kind, PrimitiveKind, Reflect, Tags, TypeCache, TypeDescriptor,
    TypeDescriptorBuilder, TypeKind,
};
pub use value::{
    can_assign, convert, DynamicData, DynamicValue, FromValue, IntoValue, MapEntries, Number,
    Value,
};
