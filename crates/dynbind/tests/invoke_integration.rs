// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Invoker and reflection integration tests
//!
//! Covers descriptors for Rust types, native and synthesized calls, and
//! the pipe-expression evaluator.

use dynbind::{
    describe, evaluate, make_func, BindError, Callable, DynamicData, FuncBuilder,
    FunctionRegistry, Kind, PrimitiveKind, Reflect, TypeDescriptor, TypeDescriptorBuilder,
};
use std::sync::Arc;

#[allow(dead_code)]
struct User {
    name: String,
    github: String,
    private: String,
}

impl Reflect for User {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptorBuilder::new("User")
            .tagged_field("Name", TypeDescriptor::string(), r#"json:"name" db:"user_name""#)
            .tagged_field("Github", TypeDescriptor::string(), r#"json:"github""#)
            .string_field("private")
            .build()
    }
}

fn ints(values: &[i64]) -> Vec<DynamicData> {
    values.iter().map(|v| DynamicData::of(*v)).collect()
}

#[test]
fn test_describe_struct_fields_and_tags() {
    let user = User {
        name: "Ariel".into(),
        github: "a8m".into(),
        private: String::new(),
    };
    let desc = describe(&user);
    assert_eq!(desc.kind(), Kind::Struct);
    assert!(Arc::ptr_eq(&desc, &describe(&user)));

    let fields = desc.fields().expect("struct");
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Name", "Github", "private"]);
    assert_eq!(fields[0].tag("db"), Some("user_name"));
    assert_eq!(fields[1].tag("db"), None);
    assert_eq!(fields[2].tag("json"), None);
    assert!(!fields[2].is_exported());
}

#[test]
fn test_call_add() {
    let add = Callable::native("Add", |a: i64, b: i64| a + b);
    assert_eq!(add.call(&ints(&[2, 3])).ok(), Some(ints(&[5])));
    assert_eq!(
        add.call(&ints(&[2])),
        Err(BindError::ArityMismatch {
            expected: 2,
            found: 1,
            variadic: false
        })
    );
}

#[test]
fn test_make_func_is_indistinguishable() {
    let native = Callable::native("Add", |a: i64, b: i64| a + b);
    let synthesized = make_func(native.descriptor(), |args| {
        let a: i64 = args[0].get()?;
        let b: i64 = args[1].get()?;
        Ok(vec![DynamicData::of(a + b)])
    })
    .expect("func descriptor");

    assert_eq!(native.descriptor(), synthesized.descriptor());
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..100 {
        let args = ints(&[rng.i64(-1_000_000..1_000_000), rng.i64(-1_000_000..1_000_000)]);
        assert_eq!(native.call(&args), synthesized.call(&args));
    }
    assert_eq!(native.call(&ints(&[1])), synthesized.call(&ints(&[1])));
}

#[test]
fn test_variadic_synthesized_join() {
    let desc = FuncBuilder::new()
        .primitive_param(PrimitiveKind::String)
        .variadic(TypeDescriptor::string())
        .primitive_result(PrimitiveKind::String)
        .build();
    let join = make_func(&desc, |args| {
        let sep: String = args[0].get()?;
        let parts: Vec<String> = args[1].get()?;
        Ok(vec![DynamicData::string(parts.join(&sep))])
    })
    .expect("func descriptor");

    let args = [
        DynamicData::string("-"),
        DynamicData::string("a"),
        DynamicData::string("b"),
        DynamicData::string("c"),
    ];
    let out = join.call(&args).expect("call");
    assert_eq!(out[0].get::<String>().ok().as_deref(), Some("a-b-c"));

    assert_eq!(
        join.call(&[DynamicData::string("-"), DynamicData::of(1i64)]),
        Err(BindError::TypeMismatch {
            index: 1,
            expected: Kind::String,
            found: Kind::I64
        })
    );
}

#[test]
fn test_evaluate_repeat() {
    let registry = FunctionRegistry::with_builtins();
    assert_eq!(
        evaluate(r#"{{ "hello" 4 | repeat }}"#, &registry).ok().as_deref(),
        Some("hellohellohellohello")
    );
}

#[test]
fn test_evaluate_custom_registry() {
    let mut registry = FunctionRegistry::new();
    registry.register_native("pad", |s: String, width: i64| {
        format!("{:>width$}", s, width = usize::try_from(width).unwrap_or(0))
    });
    assert_eq!(
        evaluate(r#"{{ "x" 3 | pad }}"#, &registry).ok().as_deref(),
        Some("  x")
    );
    assert_eq!(
        evaluate(r#"{{ "x" 3 | missing }}"#, &registry),
        Err(BindError::UnknownFunction("missing".into()))
    );
}

#[test]
fn test_swap_function_variable() {
    let desc = FuncBuilder::new()
        .primitive_param(PrimitiveKind::I64)
        .primitive_param(PrimitiveKind::I64)
        .primitive_result(PrimitiveKind::I64)
        .build();
    let mut slot = DynamicData::pointer_to(DynamicData::new(&desc));

    let swapped = make_func(&desc, |args| Ok(vec![args[0].clone()])).expect("func");
    slot.reflect_mut()
        .elem()
        .and_then(|mut f| f.set(swapped.to_data()))
        .expect("settable");

    let target = slot.reflect().elem().expect("non-nil");
    assert_eq!(target.call(&ints(&[9, 1])).ok(), Some(ints(&[9])));
}
