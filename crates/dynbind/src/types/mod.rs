// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information: kinds, descriptors, builders and the shared cache.

mod builder;
mod cache;
mod descriptor;
mod kind;

pub use builder::{FuncBuilder, TypeDescriptorBuilder};
pub use cache::{describe, describe_type, Reflect, TypeCache};
pub use descriptor::{
    parse_tags, FieldDescriptor, FuncDescriptor, PrimitiveKind, Tags, TypeDescriptor, TypeKind,
};
pub use kind::{Conversion, Kind};
