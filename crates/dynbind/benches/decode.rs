// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//!
//! Benchmark: map/struct decoding and call dispatch
//!
//! Measures entry splitting plus conversion for growing inputs, and the
//! overhead of the uniform calling convention over native and synthesized
//! callables.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dynbind::{
    decode_map, decode_struct, evaluate, make_func, Callable, DynamicData, FunctionRegistry,
    PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder,
};

fn map_input(entries: usize) -> String {
    (0..entries)
        .map(|i| format!("{}=value{}", i, i))
        .collect::<Vec<_>>()
        .join(",")
}

fn bench_decode_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_map");
    let desc = TypeDescriptor::map(
        TypeDescriptor::primitive(PrimitiveKind::I32),
        TypeDescriptor::string(),
    );

    for size in [8, 64, 512] {
        let input = map_input(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
                decode_map(black_box(input), target.reflect_mut()).ok();
                target
            });
        });
    }
    group.finish();
}

fn bench_decode_struct(c: &mut Criterion) {
    let desc = TypeDescriptorBuilder::new("User")
        .string_field("Name")
        .string_field("Github")
        .string_field("Email")
        .string_field("private")
        .build();
    let input = "Name=Ariel,Github=a8m,Email=a@example.com,private=x,Unknown=y";

    c.bench_function("decode_struct", |b| {
        b.iter(|| {
            let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
            decode_struct(black_box(input), target.reflect_mut()).ok();
            target
        });
    });
}

fn bench_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("call");
    let native = Callable::native("Add", |a: i64, b: i64| a + b);
    let synthesized = make_func(native.descriptor(), |args| {
        let a: i64 = args[0].get()?;
        let b: i64 = args[1].get()?;
        Ok(vec![DynamicData::of(a + b)])
    });
    let args = [DynamicData::of(2i64), DynamicData::of(3i64)];

    group.bench_function("native", |b| b.iter(|| native.call(black_box(&args))));
    if let Ok(synthesized) = synthesized {
        group.bench_function("synthesized", |b| {
            b.iter(|| synthesized.call(black_box(&args)))
        });
    }

    let registry = FunctionRegistry::with_builtins();
    group.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(r#"{{ "ab" 8 | repeat }}"#), &registry))
    });
    group.finish();
}

criterion_group!(benches, bench_decode_map, bench_decode_struct, bench_call);
criterion_main!(benches);
