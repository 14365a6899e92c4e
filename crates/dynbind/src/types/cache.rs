// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared, read-mostly descriptor cache.
//!
//! Descriptors for Rust types are built once per `TypeId` and interned by
//! shape, so structurally identical descriptors share one allocation.
//! Readers never block each other; writers are serialized.

use crate::types::{PrimitiveKind, TypeDescriptor};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Rust types with a static shape.
///
/// Implement this for your own structs with [`TypeDescriptorBuilder`](crate::TypeDescriptorBuilder):
///
/// ```ignore
/// impl Reflect for User {
///     fn descriptor() -> Arc<TypeDescriptor> {
///         TypeDescriptorBuilder::new("User").string_field("Name").build()
///     }
/// }
/// ```
pub trait Reflect: 'static {
    /// Build the descriptor. Called at most once per cache for each type.
    fn descriptor() -> Arc<TypeDescriptor>;

    /// Build the descriptor, resolving nested types through `cache`.
    ///
    /// Container types override this so a private [`TypeCache`] holds every
    /// shape it describes. Leaf types use [`Reflect::descriptor`].
    fn descriptor_in(cache: &TypeCache) -> Arc<TypeDescriptor> {
        let _ = cache;
        Self::descriptor()
    }
}

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> Arc<TypeDescriptor> {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_reflect_primitive!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> Arc<TypeDescriptor> {
        Self::descriptor_in(TypeCache::global())
    }

    fn descriptor_in(cache: &TypeCache) -> Arc<TypeDescriptor> {
        TypeDescriptor::slice(cache.describe_type::<T>())
    }
}

impl<K: Reflect, V: Reflect> Reflect for HashMap<K, V> {
    fn descriptor() -> Arc<TypeDescriptor> {
        Self::descriptor_in(TypeCache::global())
    }

    fn descriptor_in(cache: &TypeCache) -> Arc<TypeDescriptor> {
        TypeDescriptor::map(cache.describe_type::<K>(), cache.describe_type::<V>())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn descriptor() -> Arc<TypeDescriptor> {
        Self::descriptor_in(TypeCache::global())
    }

    fn descriptor_in(cache: &TypeCache) -> Arc<TypeDescriptor> {
        TypeDescriptor::pointer(cache.describe_type::<T>())
    }
}

/// Descriptor cache keyed by `TypeId` and by shape.
#[derive(Debug, Default)]
pub struct TypeCache {
    by_type: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    by_shape: DashMap<String, Arc<TypeDescriptor>>,
}

static GLOBAL_CACHE: OnceLock<TypeCache> = OnceLock::new();

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by [`describe`] and [`describe_type`].
    pub fn global() -> &'static TypeCache {
        GLOBAL_CACHE.get_or_init(TypeCache::new)
    }

    /// Descriptor for `T`, built on first use.
    pub fn describe_type<T: Reflect>(&self) -> Arc<TypeDescriptor> {
        let id = TypeId::of::<T>();
        if let Some(desc) = self.by_type.read().get(&id) {
            return desc.clone();
        }

        // Built outside the lock: composite descriptors recurse into the cache.
        let built = self.intern(T::descriptor_in(self));
        log::debug!("[cache] registered {} as {}", type_name::<T>(), built);
        self.by_type.write().entry(id).or_insert(built).clone()
    }

    /// Return the shared descriptor with the same shape, registering `desc`
    /// if it is the first of its shape.
    pub fn intern(&self, desc: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        self.by_shape.entry(desc.shape()).or_insert(desc).value().clone()
    }

    /// Look up an interned descriptor by shape signature.
    pub fn lookup_shape(&self, shape: &str) -> Option<Arc<TypeDescriptor>> {
        self.by_shape.get(shape).map(|entry| entry.value().clone())
    }

    /// Number of distinct shapes interned.
    pub fn len(&self) -> usize {
        self.by_shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_shape.is_empty()
    }

    pub fn clear(&self) {
        self.by_type.write().clear();
        self.by_shape.clear();
    }
}

/// Describe a Rust value through the global cache.
pub fn describe<T: Reflect>(_value: &T) -> Arc<TypeDescriptor> {
    describe_type::<T>()
}

/// Describe a Rust type through the global cache.
pub fn describe_type<T: Reflect>() -> Arc<TypeDescriptor> {
    TypeCache::global().describe_type::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, TypeDescriptorBuilder};
    use std::thread;

    struct Sample;

    impl Reflect for Sample {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptorBuilder::new("Sample")
                .string_field("Name")
                .field("count", PrimitiveKind::I32)
                .build()
        }
    }

    #[test]
    fn test_describe_is_memoized() {
        let cache = TypeCache::new();
        let a = cache.describe_type::<Vec<String>>();
        let b = cache.describe_type::<Vec<String>>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.to_string(), "[]string");
    }

    #[test]
    fn test_private_cache_holds_nested_shapes() {
        let cache = TypeCache::new();
        let desc = cache.describe_type::<HashMap<u16, Vec<i8>>>();
        assert_eq!(desc.to_string(), "map[uint16][]int8");
        for shape in ["uint16", "int8", "[]int8", "map[uint16][]int8"] {
            assert!(cache.lookup_shape(shape).is_some(), "{shape}");
        }
        assert_eq!(cache.len(), 4);

        let elem = desc.elem().expect("map elem");
        assert!(Arc::ptr_eq(elem, &cache.describe_type::<Vec<i8>>()));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.lookup_shape("[]int8").is_none());
    }

    #[test]
    fn test_intern_by_shape() {
        let cache = TypeCache::new();
        let first = cache.intern(TypeDescriptor::map(
            TypeDescriptor::primitive(PrimitiveKind::I64),
            TypeDescriptor::string(),
        ));
        let second = cache.intern(TypeDescriptor::map(
            TypeDescriptor::primitive(PrimitiveKind::I64),
            TypeDescriptor::string(),
        ));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.lookup_shape("map[int64]string").is_some());
    }

    #[test]
    fn test_describe_value() {
        let scores: HashMap<i64, String> = HashMap::new();
        let desc = describe(&scores);
        assert_eq!(desc.kind(), Kind::Map);
        assert_eq!(desc.to_string(), "map[int64]string");

        let boxed = describe(&Box::new(Sample));
        assert_eq!(boxed.to_string(), "*Sample");
        let fields = boxed.elem().and_then(|e| e.fields()).expect("struct fields");
        assert_eq!(fields[0].name, "Name");
        assert_eq!(fields[1].name, "count");
    }

    #[test]
    fn test_concurrent_readers() {
        let cache = Arc::new(TypeCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.describe_type::<HashMap<String, Vec<i64>>>())
            })
            .collect();
        let descs: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        assert!(descs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
