//! Typed label extraction.
//!
//! A [`LabelExtractor<T>`] turns a domain object into a [`LabelSet`] and
//! declares which label names it can fill. Extractors are bound to their
//! object type at build time and looked up by [`TypeId`] at emission time,
//! so `scope.label_from(&request)` needs no type annotations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{LabelNames, LabelSet};

/// Derives label values from objects of type `T`.
pub trait LabelExtractor<T>: Send + Sync {
    /// Extract label values from `object`.
    ///
    /// Keys outside [`target_label_names`](Self::target_label_names) are
    /// allowed but never read.
    fn extract_labels(&self, object: &T) -> LabelSet;

    /// Label names (and their defaults) this extractor can fill.
    fn target_label_names(&self) -> LabelNames;
}

/// Build an extractor from a closure and its declared names.
///
/// ```rust
/// # use huginn::{LabelNames, LabelSet, LabelExtractor, from_fn};
/// struct Request { method: &'static str }
///
/// let extractor = from_fn(LabelNames::new().names(["method"]), |r: &Request| {
///     LabelSet::new().label("method", r.method)
/// });
/// let labels = extractor.extract_labels(&Request { method: "GET" });
/// assert_eq!(labels.get("method"), Some("GET"));
/// ```
pub fn from_fn<T, F>(names: LabelNames, f: F) -> FnExtractor<T, F>
where
    F: Fn(&T) -> LabelSet + Send + Sync,
{
    FnExtractor {
        names,
        f,
        _marker: PhantomData,
    }
}

/// Extractor returned by [`from_fn`].
pub struct FnExtractor<T, F> {
    names: LabelNames,
    f: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> LabelExtractor<T> for FnExtractor<T, F>
where
    F: Fn(&T) -> LabelSet + Send + Sync,
{
    fn extract_labels(&self, object: &T) -> LabelSet {
        (self.f)(object)
    }

    fn target_label_names(&self) -> LabelNames {
        self.names.clone()
    }
}

/// Type-erased extractor, keyed by the object's `TypeId` in [`ExtractorMap`].
trait ErasedExtractor: Send + Sync {
    fn extract(&self, object: &dyn Any) -> Option<LabelSet>;
}

struct Bound<T, E> {
    extractor: E,
    _marker: PhantomData<fn(&T)>,
}

impl<T, E> ErasedExtractor for Bound<T, E>
where
    T: Any,
    E: LabelExtractor<T>,
{
    fn extract(&self, object: &dyn Any) -> Option<LabelSet> {
        object
            .downcast_ref::<T>()
            .map(|object| self.extractor.extract_labels(object))
    }
}

/// Object type → extractor bindings of one metric.
#[derive(Clone, Default)]
pub struct ExtractorMap {
    extractors: HashMap<TypeId, Arc<dyn ErasedExtractor>>,
}

impl ExtractorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `extractor` to `T`, replacing any previous binding for `T`.
    pub(crate) fn bind<T, E>(&mut self, extractor: E)
    where
        T: Any,
        E: LabelExtractor<T> + 'static,
    {
        self.extractors.insert(
            TypeId::of::<T>(),
            Arc::new(Bound {
                extractor,
                _marker: PhantomData,
            }),
        );
    }

    /// Run the extractor bound to `T`, or `None` when `T` has no binding.
    pub fn extract<T: Any>(&self, object: &T) -> Option<LabelSet> {
        self.extractors
            .get(&TypeId::of::<T>())
            .and_then(|extractor| extractor.extract(object))
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.extractors.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl fmt::Debug for ExtractorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorMap")
            .field("bindings", &self.extractors.len())
            .finish()
    }
}
