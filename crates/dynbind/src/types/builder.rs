// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::types::{FieldDescriptor, FuncDescriptor, PrimitiveKind, TypeDescriptor};
use std::sync::Arc;

/// Builder for struct type descriptors.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, TypeDescriptor::primitive(kind)));
        self
    }

    /// Add a field with a type descriptor.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a field carrying a conventional tag string (`json:"name"`).
    pub fn tagged_field(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
        tag: &str,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_desc).with_tag_str(tag));
        self
    }

    /// Add a prepared field descriptor.
    pub fn push(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add a slice field.
    pub fn slice_field(self, name: impl Into<String>, elem: Arc<TypeDescriptor>) -> Self {
        self.field_with_type(name, TypeDescriptor::slice(elem))
    }

    /// Add a map field.
    pub fn map_field(
        self,
        name: impl Into<String>,
        key: PrimitiveKind,
        elem: Arc<TypeDescriptor>,
    ) -> Self {
        self.field_with_type(name, TypeDescriptor::map(TypeDescriptor::primitive(key), elem))
    }

    /// Add a pointer-to-struct field.
    pub fn pointer_field(self, name: impl Into<String>, pointee: Arc<TypeDescriptor>) -> Self {
        self.field_with_type(name, TypeDescriptor::pointer(pointee))
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> Arc<TypeDescriptor> {
        TypeDescriptor::struct_type(self.name, self.fields)
    }
}

/// Builder for func type descriptors.
#[derive(Debug, Default)]
pub struct FuncBuilder {
    params: Vec<Arc<TypeDescriptor>>,
    variadic: Option<Arc<TypeDescriptor>>,
    results: Vec<Arc<TypeDescriptor>>,
}

impl FuncBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fixed parameter.
    pub fn param(mut self, type_desc: Arc<TypeDescriptor>) -> Self {
        self.params.push(type_desc);
        self
    }

    pub fn primitive_param(self, kind: PrimitiveKind) -> Self {
        self.param(TypeDescriptor::primitive(kind))
    }

    /// Accept zero or more trailing `elem` arguments.
    pub fn variadic(mut self, elem: Arc<TypeDescriptor>) -> Self {
        self.variadic = Some(elem);
        self
    }

    /// Append a result.
    pub fn result(mut self, type_desc: Arc<TypeDescriptor>) -> Self {
        self.results.push(type_desc);
        self
    }

    pub fn primitive_result(self, kind: PrimitiveKind) -> Self {
        self.result(TypeDescriptor::primitive(kind))
    }

    pub fn signature(self) -> FuncDescriptor {
        match self.variadic {
            Some(elem) => FuncDescriptor::variadic(self.params, elem, self.results),
            None => FuncDescriptor::new(self.params, self.results),
        }
    }

    /// Build the func TypeDescriptor.
    pub fn build(self) -> Arc<TypeDescriptor> {
        TypeDescriptor::func(self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    #[test]
    fn test_builder_struct() {
        let address = TypeDescriptorBuilder::new("Address")
            .string_field("Street")
            .build();
        let desc = TypeDescriptorBuilder::new("User")
            .tagged_field("Name", TypeDescriptor::string(), r#"json:"name""#)
            .field("Age", PrimitiveKind::U8)
            .slice_field("Tags", TypeDescriptor::string())
            .map_field("Scores", PrimitiveKind::I64, TypeDescriptor::string())
            .pointer_field("Home", address)
            .build();

        let fields = desc.fields().expect("struct");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].tag("json"), Some("name"));
        assert_eq!(fields[1].kind(), Kind::U8);
        assert_eq!(fields[2].kind(), Kind::Slice);
        assert_eq!(fields[3].kind(), Kind::Map);
        assert_eq!(fields[4].type_desc.to_string(), "*Address");
        assert!(fields.iter().all(|f| f.owner().is_some()));
    }

    #[test]
    fn test_func_builder() {
        let desc = FuncBuilder::new()
            .primitive_param(PrimitiveKind::String)
            .variadic(TypeDescriptor::primitive(PrimitiveKind::I64))
            .primitive_result(PrimitiveKind::String)
            .build();
        let func = desc.func_descriptor().expect("func");
        assert!(func.is_variadic());
        assert_eq!(func.num_in(), 2);
        assert_eq!(func.num_out(), 1);
        assert_eq!(desc.to_string(), "func(string, ...int64) string");
    }
}
