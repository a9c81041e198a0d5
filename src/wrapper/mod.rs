//! Label-resolving wrappers around metric families.
//!
//! A [`MetricWrapper`] owns one [`Collector`] together with its ordered
//! [`LabelNames`], a [`MissingLabelPolicy`] and the registered extractors.
//! Every emission goes through a [`LabelScope`]:
//!
//! ```text
//! wrapper.labels()            EMPTY
//!     .label_from(&request)   ACCUMULATING
//!     .label("status", 200)   ACCUMULATING
//!     .inc()                  RESOLVED: scope consumed, labels dropped
//! ```
//!
//! The scope is an ordinary value owned by the caller, so concurrent
//! callers never share an accumulator, and the terminal operation takes it
//! by value, so its labels cannot outlive the emission on any exit path.

mod builder;
mod ops;

use std::any::Any;
use std::fmt::Display;

use tracing::debug;

use crate::Result;
use crate::collector::Collector;
use crate::label::{
    ExtractorMap, LabelNames, LabelSet, MissingLabelPolicy, missing_names, resolve_values,
    should_skip,
};

pub use builder::{
    CounterWrapper, GaugeWrapper, HistogramWrapper, Huginn, SummaryWrapper, WrapperBuilder,
};
pub use ops::{CounterOps, GaugeOps, ObserveOps, ReadOps, TimerOps};

/// A metric family behind declarative label resolution.
///
/// Build one with [`Huginn`] or [`WrapperBuilder`]. Wrappers are meant to be
/// long-lived and shared; they are `Send + Sync` whenever the collector is.
#[derive(Debug)]
pub struct MetricWrapper<C: Collector> {
    collector: C,
    label_names: LabelNames,
    policy: MissingLabelPolicy,
    extractors: ExtractorMap,
}

impl<C: Collector> MetricWrapper<C> {
    pub(crate) fn new(
        collector: C,
        label_names: LabelNames,
        policy: MissingLabelPolicy,
        extractors: ExtractorMap,
    ) -> Self {
        Self {
            collector,
            label_names,
            policy,
            extractors,
        }
    }

    /// Start an emission with no labels yet.
    pub fn labels(&self) -> LabelScope<'_, C> {
        LabelScope {
            wrapper: self,
            labels: LabelSet::new(),
        }
    }

    /// Start an emission with one label.
    pub fn label(&self, name: impl Into<String>, value: impl Display) -> LabelScope<'_, C> {
        self.labels().label(name, value)
    }

    /// Start an emission with one optional label.
    pub fn label_opt<V: Display>(
        &self,
        name: impl Into<String>,
        value: Option<V>,
    ) -> LabelScope<'_, C> {
        self.labels().label_opt(name, value)
    }

    /// Start an emission with the labels extracted from `object`.
    pub fn label_from<T: Any>(&self, object: &T) -> LabelScope<'_, C> {
        self.labels().label_from(object)
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn label_names(&self) -> &LabelNames {
        &self.label_names
    }

    pub fn policy(&self) -> MissingLabelPolicy {
        self.policy
    }

    pub fn extractors(&self) -> &ExtractorMap {
        &self.extractors
    }
}

/// Labels accumulated for one emission on one [`MetricWrapper`].
///
/// Dropping a scope without a terminal operation emits nothing.
#[must_use = "labels are only emitted by a terminal operation such as `inc()` or `observe()`"]
pub struct LabelScope<'a, C: Collector> {
    wrapper: &'a MetricWrapper<C>,
    labels: LabelSet,
}

impl<'a, C: Collector> LabelScope<'a, C> {
    pub fn label(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn label_opt<V: Display>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.insert_opt(name, value);
        self
    }

    /// Merge the labels extracted from `object`.
    ///
    /// No-op when no extractor is registered for `T`.
    pub fn label_from<T: Any>(mut self, object: &T) -> Self {
        self.insert_from(object);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.labels.insert(name, value);
    }

    pub fn insert_opt<V: Display>(&mut self, name: impl Into<String>, value: Option<V>) {
        self.labels.insert_opt(name, value);
    }

    pub fn insert_from<T: Any>(&mut self, object: &T) {
        if let Some(extracted) = self.wrapper.extractors.extract(object) {
            self.labels.merge(extracted);
        }
    }

    /// Labels supplied so far.
    pub fn pending(&self) -> &LabelSet {
        &self.labels
    }

    /// Label vector a terminal operation would emit right now.
    pub fn resolved_values(&self) -> Vec<String> {
        resolve_values(&self.wrapper.label_names, &self.labels, self.wrapper.policy)
    }

    /// Whether a terminal operation would be suppressed right now.
    pub fn should_skip(&self) -> bool {
        should_skip(&self.wrapper.label_names, &self.labels, self.wrapper.policy)
    }

    /// Consume the scope and pick the child to emit on.
    ///
    /// `None` means the emission is skipped. Errors from the collector are
    /// returned as they are.
    fn resolve_child(self) -> Result<Option<C::Child>> {
        let Self { wrapper, labels } = self;
        if should_skip(&wrapper.label_names, &labels, wrapper.policy) {
            debug!(
                metric = wrapper.collector.name(),
                missing = ?missing_names(&wrapper.label_names, &labels),
                "skipping emission with unresolved labels"
            );
            return Ok(None);
        }

        let values = resolve_values(&wrapper.label_names, &labels, wrapper.policy);
        let child = if values.is_empty() {
            wrapper.collector.unlabeled()?
        } else {
            wrapper.collector.with_label_values(&values)?
        };
        Ok(Some(child))
    }

    /// Apply a mutation, or nothing when skipped.
    fn emit(self, apply: impl FnOnce(&C::Child)) -> Result<()> {
        if let Some(child) = self.resolve_child()? {
            apply(&child);
        }
        Ok(())
    }

    /// Hand over the resolved child, or the detached one when skipped.
    fn child_or_detached(self) -> Result<C::Child> {
        let wrapper = self.wrapper;
        Ok(self
            .resolve_child()?
            .unwrap_or_else(|| wrapper.collector.detached()))
    }
}
