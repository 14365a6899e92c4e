// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values and accessors.
//!
//! [`DynamicData`] owns storage laid out by a [`TypeDescriptor`](crate::TypeDescriptor);
//! [`Value`] is a borrowed view over it that enforces the settability rules.

mod accessor;
mod convert;
mod data;

pub use accessor::{parse_path, PathSegment, Value};
pub use convert::{can_assign, convert, convert_number, Number};
pub use data::{DynamicData, DynamicValue, FromValue, IntoValue, MapEntries};
