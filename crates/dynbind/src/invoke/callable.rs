// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Uniform callables over native functions and synthesized handlers.

use crate::error::{BindError, BindResult};
use crate::types::{describe_type, Conversion, FuncDescriptor, TypeDescriptor};
use crate::value::{convert, DynamicData, DynamicValue, FromValue, IntoValue};
use std::fmt;
use std::sync::Arc;

/// Calling convention shared by every callable body.
pub type CallFn = dyn Fn(&[DynamicData]) -> BindResult<Vec<DynamicData>> + Send + Sync;

#[derive(Clone)]
enum Body {
    Native(Arc<CallFn>),
    Synthesized(Arc<CallFn>),
}

impl Body {
    fn func(&self) -> &Arc<CallFn> {
        match self {
            Self::Native(f) | Self::Synthesized(f) => f,
        }
    }
}

/// A function with a func-kind descriptor, callable with dynamic arguments.
///
/// Natively bound and synthesized callables behave identically: arguments
/// are checked and converted against the declared parameters, variadic
/// tails are packed into a slice, and results are checked against the
/// declared results.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    descriptor: Arc<TypeDescriptor>,
    signature: FuncDescriptor,
    body: Body,
}

impl Callable {
    fn from_body(name: &str, descriptor: Arc<TypeDescriptor>, body: Body) -> BindResult<Self> {
        let signature = descriptor
            .func_descriptor()
            .cloned()
            .ok_or(BindError::NonFunc(descriptor.kind()))?;
        Ok(Self {
            name: Arc::from(name),
            descriptor,
            signature,
            body,
        })
    }

    /// Bind a typed Rust closure of up to four arguments.
    pub fn native<Args, F: IntoNative<Args>>(name: &str, f: F) -> Self {
        let signature = F::signature();
        Self {
            name: Arc::from(name),
            descriptor: TypeDescriptor::func(signature.clone()),
            signature,
            body: Body::Native(f.into_call_fn()),
        }
    }

    /// Bind a native function over dynamic arguments with an explicit
    /// signature. Variadic tails arrive packed as one slice argument.
    pub fn native_raw<F>(name: &str, descriptor: Arc<TypeDescriptor>, f: F) -> BindResult<Self>
    where
        F: Fn(&[DynamicData]) -> BindResult<Vec<DynamicData>> + Send + Sync + 'static,
    {
        Self::from_body(name, descriptor, Body::Native(Arc::new(f)))
    }

    /// Synthesize a callable from a generic handler.
    pub fn synthesized<F>(name: &str, descriptor: Arc<TypeDescriptor>, handler: F) -> BindResult<Self>
    where
        F: Fn(&[DynamicData]) -> BindResult<Vec<DynamicData>> + Send + Sync + 'static,
    {
        Self::from_body(name, descriptor, Body::Synthesized(Arc::new(handler)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The func-kind descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn signature(&self) -> &FuncDescriptor {
        &self.signature
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self.body, Body::Synthesized(_))
    }

    /// This callable as a func-kind value.
    pub fn to_data(&self) -> DynamicData {
        DynamicData::from_parts(
            self.descriptor.clone(),
            DynamicValue::Func(Some(self.clone())),
        )
    }

    /// Call with individual arguments; a variadic tail is collected into a slice.
    pub fn call(&self, args: &[DynamicData]) -> BindResult<Vec<DynamicData>> {
        let sig = &self.signature;
        let fixed = sig.fixed_params();
        let arity_ok = if sig.is_variadic() {
            args.len() >= fixed.len()
        } else {
            args.len() == fixed.len()
        };
        if !arity_ok {
            return Err(BindError::ArityMismatch {
                expected: fixed.len(),
                found: args.len(),
                variadic: sig.is_variadic(),
            });
        }

        let mut prepared = Vec::with_capacity(sig.num_in());
        for (index, (arg, param)) in args.iter().zip(fixed).enumerate() {
            prepared.push(coerce_arg(index, arg, param)?);
        }
        if let (Some(slice), Some(elem)) = (sig.variadic_param(), sig.variadic_elem()) {
            let tail = args[fixed.len()..]
                .iter()
                .enumerate()
                .map(|(i, arg)| coerce_arg(fixed.len() + i, arg, elem).map(DynamicData::into_value))
                .collect::<BindResult<Vec<_>>>()?;
            prepared.push(DynamicData::from_parts(
                slice.clone(),
                DynamicValue::Slice(tail),
            ));
        }
        self.invoke(&prepared)
    }

    /// Call with the variadic tail already packed as a slice.
    ///
    /// For non-variadic callables this is the same as [`Callable::call`].
    pub fn call_slice(&self, args: &[DynamicData]) -> BindResult<Vec<DynamicData>> {
        let params = self.signature.params();
        if args.len() != params.len() {
            return Err(BindError::ArityMismatch {
                expected: params.len(),
                found: args.len(),
                variadic: false,
            });
        }
        let prepared = args
            .iter()
            .zip(params)
            .enumerate()
            .map(|(index, (arg, param))| coerce_arg(index, arg, param))
            .collect::<BindResult<Vec<_>>>()?;
        self.invoke(&prepared)
    }

    fn invoke(&self, args: &[DynamicData]) -> BindResult<Vec<DynamicData>> {
        if self.is_synthesized() {
            log::debug!("[invoke] synthesized {} with {} args", self.name, args.len());
        } else {
            log::trace!("[invoke] native {} with {} args", self.name, args.len());
        }
        let results = (self.body.func())(args)?;
        self.check_results(results)
    }

    fn check_results(&self, results: Vec<DynamicData>) -> BindResult<Vec<DynamicData>> {
        let declared = self.signature.results();
        if results.len() != declared.len() {
            return Err(BindError::InvalidResultShape(format!(
                "{} returned {} results, declared {}",
                self.name,
                results.len(),
                declared.len()
            )));
        }
        results
            .into_iter()
            .zip(declared)
            .enumerate()
            .map(|(i, (result, want))| {
                let shape_error = || {
                    BindError::InvalidResultShape(format!(
                        "{} result {}: expected {}, found {}",
                        self.name,
                        i,
                        want,
                        result.descriptor()
                    ))
                };
                match result.kind().conversion_to(want.kind()) {
                    Conversion::Identity | Conversion::Interface => {
                        convert(&result, want).map_err(|_| shape_error())
                    }
                    Conversion::Numeric | Conversion::Inconvertible => Err(shape_error()),
                }
            })
            .collect()
    }
}

/// Convert an argument to its parameter type. Overflow is reported as is;
/// any other failure names the argument index.
fn coerce_arg(index: usize, arg: &DynamicData, param: &Arc<TypeDescriptor>) -> BindResult<DynamicData> {
    convert(arg, param).map_err(|err| match err {
        BindError::Overflow(kind) => BindError::Overflow(kind),
        _ => BindError::TypeMismatch {
            index,
            expected: param.kind(),
            found: arg.kind(),
        },
    })
}

/// Synthesize a callable with the given func descriptor.
///
/// The handler receives converted arguments (a variadic tail packed as a
/// slice) and its results are checked against the declared results.
pub fn make_func<F>(descriptor: &Arc<TypeDescriptor>, handler: F) -> BindResult<Callable>
where
    F: Fn(&[DynamicData]) -> BindResult<Vec<DynamicData>> + Send + Sync + 'static,
{
    Callable::synthesized("synthesized", descriptor.clone(), handler)
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("signature", &self.descriptor.to_string())
            .field("synthesized", &self.is_synthesized())
            .finish()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(self.body.func(), other.body.func())
    }
}

/// Rust closures that can be bound as native callables.
pub trait IntoNative<Args> {
    fn signature() -> FuncDescriptor;
    fn into_call_fn(self) -> Arc<CallFn>;
}

macro_rules! impl_into_native {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> IntoNative<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoValue,
            $($arg: FromValue,)*
        {
            fn signature() -> FuncDescriptor {
                FuncDescriptor::new(vec![$(describe_type::<$arg>()),*], vec![describe_type::<R>()])
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_call_fn(self) -> Arc<CallFn> {
                let declared = <Self as IntoNative<($($arg,)*)>>::signature().num_in();
                Arc::new(move |args: &[DynamicData]| -> BindResult<Vec<DynamicData>> {
                    let found = args.len();
                    let mut args = args.iter();
                    $(
                        let $arg = match args.next() {
                            Some(data) => data.get::<$arg>()?,
                            None => {
                                return Err(BindError::ArityMismatch {
                                    expected: declared,
                                    found,
                                    variadic: false,
                                })
                            }
                        };
                    )*
                    Ok(vec![DynamicData::of(self($($arg),*))])
                })
            }
        }
    };
}

impl_into_native!();
impl_into_native!(A);
impl_into_native!(A, B);
impl_into_native!(A, B, C);
impl_into_native!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FuncBuilder, Kind, PrimitiveKind};

    fn add() -> Callable {
        Callable::native("Add", |a: i64, b: i64| a + b)
    }

    fn ints(values: &[i64]) -> Vec<DynamicData> {
        values.iter().map(|v| DynamicData::of(*v)).collect()
    }

    #[test]
    fn test_native_call() {
        let results = add().call(&ints(&[2, 3])).expect("call");
        assert_eq!(results, vec![DynamicData::of(5i64)]);
        assert_eq!(add().descriptor().to_string(), "func(int64, int64) int64");
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            add().call(&ints(&[2])),
            Err(BindError::ArityMismatch {
                expected: 2,
                found: 1,
                variadic: false
            })
        );
    }

    #[test]
    fn test_typed_body_reports_declared_arity() {
        let body = IntoNative::<(i64, i64, i64)>::into_call_fn(|a: i64, b: i64, c: i64| a + b + c);
        assert_eq!(
            body(&ints(&[1])),
            Err(BindError::ArityMismatch {
                expected: 3,
                found: 1,
                variadic: false
            })
        );
        assert_eq!(body(&ints(&[1, 2, 3])).ok(), Some(ints(&[6])));

        let unit = IntoNative::<()>::into_call_fn(|| 7i64);
        assert_eq!(unit(&[]).ok(), Some(ints(&[7])));
    }

    #[test]
    fn test_type_mismatch_names_index() {
        let args = vec![DynamicData::of(1i64), DynamicData::string("x")];
        assert_eq!(
            add().call(&args),
            Err(BindError::TypeMismatch {
                index: 1,
                expected: Kind::I64,
                found: Kind::String
            })
        );
    }

    #[test]
    fn test_numeric_arguments_convert() {
        let results = add()
            .call(&[DynamicData::of(2u8), DynamicData::of(3i32)])
            .expect("convertible");
        assert_eq!(results[0].get::<i64>().ok(), Some(5));

        let narrow = Callable::native("Neg", |a: i8| -i16::from(a));
        assert_eq!(
            narrow.call(&ints(&[200])),
            Err(BindError::Overflow(Kind::I8))
        );
    }

    #[test]
    fn test_variadic_packing() {
        let desc = FuncBuilder::new()
            .primitive_param(PrimitiveKind::String)
            .variadic(TypeDescriptor::primitive(PrimitiveKind::I64))
            .primitive_result(PrimitiveKind::I64)
            .build();
        let sum = Callable::native_raw("sum", desc, |args| {
            let scale = args[0].get::<String>()?.len() as i64;
            let values: Vec<i64> = args[1].get()?;
            Ok(vec![DynamicData::of(scale * values.iter().sum::<i64>())])
        })
        .expect("func descriptor");

        let mut args = vec![DynamicData::string("xx")];
        args.extend(ints(&[1, 2, 3]));
        assert_eq!(sum.call(&args).ok(), Some(vec![DynamicData::of(12i64)]));
        assert_eq!(
            sum.call(&args[..1]).ok(),
            Some(vec![DynamicData::of(0i64)])
        );
        assert!(matches!(
            sum.call(&[]),
            Err(BindError::ArityMismatch { variadic: true, .. })
        ));

        let packed = [DynamicData::string("x"), DynamicData::of(vec![4i64, 5])];
        assert_eq!(sum.call_slice(&packed).ok(), Some(vec![DynamicData::of(9i64)]));
    }

    #[test]
    fn test_make_func_matches_native() {
        let desc = add().descriptor().clone();
        let synthesized = make_func(&desc, |args| {
            let a: i64 = args[0].get()?;
            let b: i64 = args[1].get()?;
            Ok(vec![DynamicData::of(a + b)])
        })
        .expect("func descriptor");

        assert_eq!(synthesized.descriptor(), add().descriptor());
        assert!(synthesized.is_synthesized());
        for (a, b) in [(0, 0), (2, 3), (-7, 4), (i64::MAX, 0)] {
            assert_eq!(synthesized.call(&ints(&[a, b])), add().call(&ints(&[a, b])));
        }
    }

    #[test]
    fn test_make_func_rejects_non_func() {
        let result = make_func(&TypeDescriptor::string(), |_| Ok(vec![]));
        assert!(matches!(result, Err(BindError::NonFunc(Kind::String))));
    }

    #[test]
    fn test_result_shape_is_checked() {
        let desc = add().descriptor().clone();
        let wrong_count = make_func(&desc, |_| Ok(vec![])).expect("func");
        assert!(matches!(
            wrong_count.call(&ints(&[1, 2])),
            Err(BindError::InvalidResultShape(_))
        ));

        let wrong_kind = make_func(&desc, |_| Ok(vec![DynamicData::string("5")])).expect("func");
        assert!(matches!(
            wrong_kind.call(&ints(&[1, 2])),
            Err(BindError::InvalidResultShape(_))
        ));
    }

    #[test]
    fn test_func_values_can_be_swapped() {
        let desc = add().descriptor().clone();
        let mut slot = DynamicData::pointer_to(DynamicData::new(&desc));
        let mut target = slot.reflect_mut().elem().expect("non-nil");
        assert!(matches!(target.call(&ints(&[1, 2])), Err(BindError::NilDereference)));

        let doubled = make_func(&desc, |args| {
            let a: i64 = args[0].get()?;
            let b: i64 = args[1].get()?;
            Ok(vec![DynamicData::of(2 * (a + b))])
        })
        .expect("func");
        target.set(doubled.to_data()).expect("settable");
        assert_eq!(target.call(&ints(&[1, 2])).ok(), Some(ints(&[6])));
    }
}
