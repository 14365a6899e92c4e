// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Invocation: callables, the name registry and the pipe-expression evaluator.

mod callable;
mod eval;
mod registry;

pub use callable::{make_func, CallFn, Callable, IntoNative};
pub use eval::{evaluate, Expression, Literal};
pub use registry::FunctionRegistry;
