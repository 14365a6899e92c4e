// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-based dispatch table for callables.

use crate::error::{BindError, BindResult};
use crate::invoke::{Callable, IntoNative};
use crate::types::{FuncBuilder, Kind, PrimitiveKind, TypeDescriptor};
use crate::value::DynamicData;
use std::collections::HashMap;
use std::sync::Arc;

/// Longest string `repeat` will build, in bytes.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

/// `s` repeated `count` times; negative counts give an empty string.
fn repeat_bounded(s: &str, count: i64) -> BindResult<String> {
    let count = usize::try_from(count).unwrap_or(0);
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(s.repeat(count)),
        _ => Err(BindError::Overflow(Kind::String)),
    }
}

/// Registry of callables indexed by name.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Callable>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the string builtins: `repeat`, `upper`,
    /// `lower`, `trim`, `concat` and `len`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let repeat = FuncBuilder::new()
            .primitive_param(PrimitiveKind::String)
            .primitive_param(PrimitiveKind::I64)
            .primitive_result(PrimitiveKind::String)
            .build();
        registry.register_builtin("repeat", repeat, |args| match args {
            [s, count] => {
                let s: String = s.get()?;
                let out = repeat_bounded(&s, count.get()?)?;
                Ok(vec![DynamicData::string(out)])
            }
            _ => Err(BindError::ArityMismatch {
                expected: 2,
                found: args.len(),
                variadic: false,
            }),
        });
        registry.register_native("upper", |s: String| s.to_uppercase());
        registry.register_native("lower", |s: String| s.to_lowercase());
        registry.register_native("trim", |s: String| s.trim().to_string());
        registry.register_native("len", |s: String| s.len() as i64);

        let concat = FuncBuilder::new()
            .variadic(TypeDescriptor::string())
            .primitive_result(PrimitiveKind::String)
            .build();
        registry.register_builtin("concat", concat, |args| {
            let parts: Vec<String> = match args.first() {
                Some(tail) => tail.get()?,
                None => Vec::new(),
            };
            Ok(vec![DynamicData::string(parts.concat())])
        });
        registry
    }

    fn register_builtin<F>(&mut self, name: &str, descriptor: Arc<TypeDescriptor>, f: F)
    where
        F: Fn(&[DynamicData]) -> BindResult<Vec<DynamicData>> + Send + Sync + 'static,
    {
        match Callable::native_raw(name, descriptor, f) {
            Ok(callable) => {
                self.register(callable);
            }
            Err(e) => log::warn!("[invoke] builtin {} not registered: {}", name, e),
        }
    }

    /// Register a callable under its own name, returning any callable it replaces.
    pub fn register(&mut self, callable: Callable) -> Option<Callable> {
        let previous = self
            .functions
            .insert(callable.name().to_string(), callable);
        if let Some(prev) = &previous {
            log::debug!("[invoke] replaced function {}", prev.name());
        }
        previous
    }

    /// Bind and register a typed Rust closure.
    pub fn register_native<Args, F: IntoNative<Args>>(&mut self, name: &str, f: F) -> Option<Callable> {
        self.register(Callable::native(name, f))
    }

    /// Get a callable by name
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    /// Check if a callable is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Callable> {
        self.functions.remove(name)
    }

    /// Resolve `name` and call it.
    pub fn call(&self, name: &str, args: &[DynamicData]) -> BindResult<Vec<DynamicData>> {
        self.get(name)
            .ok_or_else(|| BindError::UnknownFunction(name.to_string()))?
            .call(args)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
