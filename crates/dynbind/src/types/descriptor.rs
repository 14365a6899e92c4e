// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.
//!
//! Descriptors are immutable once built and always handed out behind an
//! [`Arc`], so they can be shared freely and interned by shape.

use crate::error::BindError;
use crate::types::Kind;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
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
}

impl PrimitiveKind {
    /// The matching [`Kind`].
    pub fn kind(self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::I8 => Kind::I8,
            Self::I16 => Kind::I16,
            Self::I32 => Kind::I32,
            Self::I64 => Kind::I64,
            Self::U8 => Kind::U8,
            Self::U16 => Kind::U16,
            Self::U32 => Kind::U32,
            Self::U64 => Kind::U64,
            Self::F32 => Kind::F32,
            Self::F64 => Kind::F64,
            Self::String => Kind::String,
        }
    }

    /// The primitive for a scalar [`Kind`], `None` for composite kinds.
    pub fn from_kind(kind: Kind) -> Option<Self> {
        Some(match kind {
            Kind::Bool => Self::Bool,
            Kind::I8 => Self::I8,
            Kind::I16 => Self::I16,
            Kind::I32 => Self::I32,
            Kind::I64 => Self::I64,
            Kind::U8 => Self::U8,
            Kind::U16 => Self::U16,
            Kind::U32 => Self::U32,
            Kind::U64 => Self::U64,
            Kind::F32 => Self::F32,
            Kind::F64 => Self::F64,
            Kind::String => Self::String,
            _ => return None,
        })
    }
}

impl FromStr for PrimitiveKind {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Self::Bool),
            "int8" | "i8" => Ok(Self::I8),
            "int16" | "i16" => Ok(Self::I16),
            "int32" | "i32" | "rune" => Ok(Self::I32),
            "int64" | "i64" | "int" => Ok(Self::I64),
            "uint8" | "u8" | "byte" => Ok(Self::U8),
            "uint16" | "u16" => Ok(Self::U16),
            "uint32" | "u32" => Ok(Self::U32),
            "uint64" | "u64" | "uint" => Ok(Self::U64),
            "float32" | "f32" => Ok(Self::F32),
            "float64" | "f64" | "float" => Ok(Self::F64),
            "string" => Ok(Self::String),
            other => Err(BindError::parse(other, "unknown primitive kind")),
        }
    }
}

impl From<PrimitiveKind> for Kind {
    fn from(p: PrimitiveKind) -> Self {
        p.kind()
    }
}

/// Tag key to tag value mapping carried by a struct field.
pub type Tags = HashMap<String, String>;

/// Parse a conventional struct tag string such as `json:"name" db:"user_name"`.
///
/// Parsing stops at the first malformed pair; pairs read before it are kept.
pub fn parse_tags(tag: &str) -> Tags {
    let mut tags = Tags::new();
    let bytes = tag.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos] == b' ' {
            pos += 1;
        }
        let start = pos;
        while pos < bytes.len()
            && bytes[pos] > b' '
            && bytes[pos] != b':'
            && bytes[pos] != b'"'
            && bytes[pos] != 0x7f
        {
            pos += 1;
        }
        if pos == start || pos + 1 >= bytes.len() || bytes[pos] != b':' || bytes[pos + 1] != b'"'
        {
            break;
        }
        let key = &tag[start..pos];
        pos += 2;

        let mut value = String::new();
        let mut closed = false;
        let mut chars = tag[pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    pos += offset + 1;
                    closed = true;
                    break;
                }
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                c => value.push(c),
            }
        }
        if !closed {
            break;
        }
        tags.insert(key.to_string(), value);
    }
    tags
}

/// Type shape enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Scalar type.
    Primitive(PrimitiveKind),
    /// Dynamically sized sequence.
    Slice(Arc<TypeDescriptor>),
    /// Key/element map.
    Map {
        key: Arc<TypeDescriptor>,
        elem: Arc<TypeDescriptor>,
    },
    /// Struct with fields in declaration order.
    Struct(Vec<FieldDescriptor>),
    /// Pointer to an element type.
    Pointer(Arc<TypeDescriptor>),
    /// Interface; zero methods accepts any value.
    Interface { methods: usize },
    /// Callable signature.
    Func(FuncDescriptor),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    type_kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    ///
    /// Struct descriptors get their fields' owner back-references wired here.
    pub fn new(name: impl Into<String>, type_kind: TypeKind) -> Arc<Self> {
        match type_kind {
            TypeKind::Struct(fields) => Self::struct_type(name, fields),
            type_kind => Arc::new(Self {
                name: name.into(),
                type_kind,
            }),
        }
    }

    /// Create an unnamed primitive type descriptor.
    pub fn primitive(kind: PrimitiveKind) -> Arc<Self> {
        Self::new("", TypeKind::Primitive(kind))
    }

    pub fn string() -> Arc<Self> {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn slice(elem: Arc<TypeDescriptor>) -> Arc<Self> {
        Self::new("", TypeKind::Slice(elem))
    }

    pub fn map(key: Arc<TypeDescriptor>, elem: Arc<TypeDescriptor>) -> Arc<Self> {
        Self::new("", TypeKind::Map { key, elem })
    }

    pub fn pointer(elem: Arc<TypeDescriptor>) -> Arc<Self> {
        Self::new("", TypeKind::Pointer(elem))
    }

    /// Interface with the given method count.
    pub fn interface(methods: usize) -> Arc<Self> {
        Self::new("", TypeKind::Interface { methods })
    }

    /// The empty interface, which accepts any value.
    pub fn any() -> Arc<Self> {
        Self::interface(0)
    }

    pub fn func(func: FuncDescriptor) -> Arc<Self> {
        Self::new("", TypeKind::Func(func))
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|owner| {
            let fields = fields
                .into_iter()
                .enumerate()
                .map(|(index, mut field)| {
                    field.owner = owner.clone();
                    field.index = index;
                    field
                })
                .collect();
            Self {
                name,
                type_kind: TypeKind::Struct(fields),
            }
        })
    }

    /// Declared name; empty for unnamed types.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_kind(&self) -> &TypeKind {
        &self.type_kind
    }

    /// The closed kind of this type.
    pub fn kind(&self) -> Kind {
        match &self.type_kind {
            TypeKind::Primitive(p) => p.kind(),
            TypeKind::Slice(_) => Kind::Slice,
            TypeKind::Map { .. } => Kind::Map,
            TypeKind::Struct(_) => Kind::Struct,
            TypeKind::Pointer(_) => Kind::Pointer,
            TypeKind::Interface { .. } => Kind::Interface,
            TypeKind::Func(_) => Kind::Func,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.type_kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.type_kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Get field index by exact name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Element type of slices, pointers and maps.
    pub fn elem(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.type_kind {
            TypeKind::Slice(elem) | TypeKind::Pointer(elem) | TypeKind::Map { elem, .. } => {
                Some(elem)
            }
            _ => None,
        }
    }

    /// Key type of maps.
    pub fn key(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.type_kind {
            TypeKind::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn func_descriptor(&self) -> Option<&FuncDescriptor> {
        match &self.type_kind {
            TypeKind::Func(func) => Some(func),
            _ => None,
        }
    }

    /// Method count of interfaces.
    pub fn num_methods(&self) -> Option<usize> {
        match self.type_kind {
            TypeKind::Interface { methods } => Some(methods),
            _ => None,
        }
    }

    /// True for the empty interface.
    pub fn accepts_any(&self) -> bool {
        self.num_methods() == Some(0)
    }

    /// Canonical structural signature, used as the shape identity.
    ///
    /// Named types are prefixed with their name, so two distinct named
    /// types never share a shape.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render(&mut out, false);
        out
    }

    fn render(&self, out: &mut impl fmt::Write, display: bool) -> fmt::Result {
        if !self.name.is_empty() {
            if display {
                return out.write_str(&self.name);
            }
            write!(out, "{}:", self.name)?;
        }
        match &self.type_kind {
            TypeKind::Primitive(p) => out.write_str(p.kind().name()),
            TypeKind::Slice(elem) => {
                out.write_str("[]")?;
                elem.render(out, display)
            }
            TypeKind::Map { key, elem } => {
                out.write_str("map[")?;
                key.render(out, display)?;
                out.write_char(']')?;
                elem.render(out, display)
            }
            TypeKind::Pointer(elem) => {
                out.write_char('*')?;
                elem.render(out, display)
            }
            TypeKind::Interface { methods: 0 } => out.write_str("interface {}"),
            TypeKind::Interface { methods } => write!(out, "interface {{ {} methods }}", methods),
            TypeKind::Func(func) => func.render(out, display),
            TypeKind::Struct(fields) if fields.is_empty() => out.write_str("struct {}"),
            TypeKind::Struct(fields) => {
                out.write_str("struct { ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.write_str("; ")?;
                    }
                    write!(out, "{} ", field.name)?;
                    field.type_desc.render(out, display)?;
                    if !field.tags.is_empty() {
                        let mut tags: Vec<_> = field.tags.iter().collect();
                        tags.sort();
                        out.write_str(" `")?;
                        for (j, (key, value)) in tags.into_iter().enumerate() {
                            if j > 0 {
                                out.write_char(' ')?;
                            }
                            write!(out, "{}:{:?}", key, value)?;
                        }
                        out.write_char('`')?;
                    }
                }
                out.write_str(" }")
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Tag entries.
    pub tags: Tags,
    owner: Weak<TypeDescriptor>,
    index: usize,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            tags: Tags::new(),
            owner: Weak::new(),
            index: 0,
        }
    }

    /// Add one tag entry.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add the entries of a conventional tag string.
    pub fn with_tag_str(mut self, tag: &str) -> Self {
        self.tags.extend(parse_tags(tag));
        self
    }

    /// Look up a tag value; `None` when the key is absent.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Exported fields start with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn kind(&self) -> Kind {
        self.type_desc.kind()
    }

    /// Position in the owning struct's declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The struct this field belongs to, while that descriptor is alive.
    pub fn owner(&self) -> Option<Arc<TypeDescriptor>> {
        self.owner.upgrade()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_desc == other.type_desc && self.tags == other.tags
    }
}

impl Eq for FieldDescriptor {}

/// Callable signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDescriptor {
    params: Vec<Arc<TypeDescriptor>>,
    results: Vec<Arc<TypeDescriptor>>,
    variadic: bool,
}

impl FuncDescriptor {
    /// Non-variadic signature.
    pub fn new(params: Vec<Arc<TypeDescriptor>>, results: Vec<Arc<TypeDescriptor>>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    /// Variadic signature: `fixed` parameters followed by zero or more `elem`.
    ///
    /// The trailing parameter is recorded as a slice of `elem`.
    pub fn variadic(
        mut fixed: Vec<Arc<TypeDescriptor>>,
        elem: Arc<TypeDescriptor>,
        results: Vec<Arc<TypeDescriptor>>,
    ) -> Self {
        fixed.push(TypeDescriptor::slice(elem));
        Self {
            params: fixed,
            results,
            variadic: true,
        }
    }

    /// All declared parameters; a variadic tail appears as its slice type.
    pub fn params(&self) -> &[Arc<TypeDescriptor>] {
        &self.params
    }

    pub fn results(&self) -> &[Arc<TypeDescriptor>] {
        &self.results
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    pub fn num_out(&self) -> usize {
        self.results.len()
    }

    /// Parameters that must always be supplied.
    pub fn fixed_params(&self) -> &[Arc<TypeDescriptor>] {
        match self.params.split_last() {
            Some((_, fixed)) if self.variadic => fixed,
            _ => &self.params,
        }
    }

    /// The trailing slice parameter of a variadic signature.
    pub fn variadic_param(&self) -> Option<&Arc<TypeDescriptor>> {
        if self.variadic {
            self.params.last()
        } else {
            None
        }
    }

    /// Element type repeated by the variadic tail.
    pub fn variadic_elem(&self) -> Option<&Arc<TypeDescriptor>> {
        self.variadic_param().and_then(|p| p.elem())
    }

    fn render(&self, out: &mut impl fmt::Write, display: bool) -> fmt::Result {
        out.write_str("func(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            match param.elem() {
                Some(elem) if self.variadic && i == last => {
                    out.write_str("...")?;
                    elem.render(out, display)?;
                }
                _ => param.render(out, display)?,
            }
        }
        out.write_char(')')?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => {
                out.write_char(' ')?;
                single.render(out, display)
            }
            many => {
                out.write_str(" (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    result.render(out, display)?;
                }
                out.write_char(')')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int64() -> Arc<TypeDescriptor> {
        TypeDescriptor::primitive(PrimitiveKind::I64)
    }

    #[test]
    fn test_struct_fields_keep_declaration_order() {
        let fields = vec![
            FieldDescriptor::new("Zeta", int64()),
            FieldDescriptor::new("Alpha", TypeDescriptor::string()),
            FieldDescriptor::new("mid", int64()),
        ];
        let desc = TypeDescriptor::struct_type("Point", fields);

        let names: Vec<_> = desc
            .fields()
            .map(|f| f.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, ["Zeta", "Alpha", "mid"]);
        assert_eq!(desc.field_index("mid"), Some(2));
        assert!(desc.field("missing").is_none());
    }

    #[test]
    fn test_field_owner_and_export() {
        let desc = TypeDescriptor::struct_type(
            "User",
            vec![
                FieldDescriptor::new("Name", TypeDescriptor::string()),
                FieldDescriptor::new("private", TypeDescriptor::string()),
            ],
        );
        let fields = desc.fields().expect("struct");
        assert!(fields[0].is_exported());
        assert!(!fields[1].is_exported());
        assert_eq!(fields[1].index(), 1);
        let owner = fields[0].owner().expect("owner alive");
        assert_eq!(owner.name(), "User");
    }

    #[test]
    fn test_tag_lookup_absent_is_none() {
        let field =
            FieldDescriptor::new("Name", TypeDescriptor::string()).with_tag("json", "name");
        assert_eq!(field.tag("json"), Some("name"));
        assert_eq!(field.tag("xml"), None);
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(r#"json:"name,omitempty" db:"user_name" note:"say \"hi\"""#);
        assert_eq!(tags.get("json").map(String::as_str), Some("name,omitempty"));
        assert_eq!(tags.get("db").map(String::as_str), Some("user_name"));
        assert_eq!(tags.get("note").map(String::as_str), Some("say \"hi\""));

        let partial = parse_tags(r#"json:"ok" broken"#);
        assert_eq!(partial.len(), 1);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_signatures() {
        let map = TypeDescriptor::map(int64(), TypeDescriptor::string());
        assert_eq!(map.to_string(), "map[int64]string");
        assert_eq!(TypeDescriptor::slice(TypeDescriptor::any()).to_string(), "[]interface {}");

        let user = TypeDescriptor::struct_type(
            "User",
            vec![FieldDescriptor::new("Name", TypeDescriptor::string())],
        );
        assert_eq!(TypeDescriptor::pointer(user.clone()).to_string(), "*User");
        assert_eq!(user.shape(), "User:struct { Name string }");

        let func = FuncDescriptor::variadic(
            vec![int64()],
            TypeDescriptor::string(),
            vec![TypeDescriptor::string()],
        );
        assert_eq!(
            TypeDescriptor::func(func).to_string(),
            "func(int64, ...string) string"
        );
    }

    #[test]
    fn test_render_into_string_and_formatter() {
        let row = TypeDescriptor::struct_type(
            "Row",
            vec![FieldDescriptor::new("Id", int64()).with_tag("db", "id")],
        );
        assert_eq!(row.shape(), r#"Row:struct { Id int64 `db:"id"` }"#);
        assert_eq!(format!("{}", row), "Row");
        assert_eq!(format!("{}", TypeDescriptor::slice(row)), "[]Row");
    }

    #[test]
    fn test_variadic_layout() {
        let func = FuncDescriptor::variadic(vec![int64()], TypeDescriptor::string(), vec![]);
        assert!(func.is_variadic());
        assert_eq!(func.num_in(), 2);
        assert_eq!(func.fixed_params().len(), 1);
        assert_eq!(func.variadic_param().map(|p| p.kind()), Some(Kind::Slice));
        assert_eq!(func.variadic_elem().map(|e| e.kind()), Some(Kind::String));

        let plain = FuncDescriptor::new(vec![int64(), int64()], vec![int64()]);
        assert_eq!(plain.fixed_params().len(), 2);
        assert!(plain.variadic_elem().is_none());
    }

    #[test]
    fn test_identity_is_shape() {
        let a = TypeDescriptor::map(int64(), TypeDescriptor::string());
        let b = TypeDescriptor::map(int64(), TypeDescriptor::string());
        let c = TypeDescriptor::map(int64(), int64());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn test_primitive_kind_from_str() {
        assert_eq!("int".parse::<PrimitiveKind>().ok(), Some(PrimitiveKind::I64));
        assert_eq!("uint8".parse::<PrimitiveKind>().ok(), Some(PrimitiveKind::U8));
        assert!("complex128".parse::<PrimitiveKind>().is_err());
    }
}
