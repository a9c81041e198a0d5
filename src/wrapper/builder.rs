//! Builder for label-resolving wrappers

use std::any::Any;
use std::time::Duration;

use metrics::Unit;
use tracing::debug;

use super::MetricWrapper;
use crate::Result;
use crate::collector::{
    CollectorBuilder, CounterBuilder, CounterVec, GaugeBuilder, GaugeVec, HistogramBuilder,
    HistogramVec, SummaryBuilder, SummaryVec,
};
use crate::label::{ExtractorMap, LabelExtractor, LabelNames, MissingLabelPolicy};

/// Counter behind label resolution.
pub type CounterWrapper = MetricWrapper<CounterVec>;
/// Gauge behind label resolution.
pub type GaugeWrapper = MetricWrapper<GaugeVec>;
/// Histogram behind label resolution.
pub type HistogramWrapper = MetricWrapper<HistogramVec>;
/// Summary behind label resolution.
pub type SummaryWrapper = MetricWrapper<SummaryVec>;

/// Main entry point for building wrappers.
pub struct Huginn;

impl Huginn {
    /// Start building a counter.
    pub fn counter() -> WrapperBuilder<CounterBuilder> {
        WrapperBuilder::new(CounterBuilder::default())
    }

    /// Start building a gauge.
    pub fn gauge() -> WrapperBuilder<GaugeBuilder> {
        WrapperBuilder::new(GaugeBuilder::default())
    }

    /// Start building a histogram.
    pub fn histogram() -> WrapperBuilder<HistogramBuilder> {
        WrapperBuilder::new(HistogramBuilder::default())
    }

    /// Start building a summary.
    pub fn summary() -> WrapperBuilder<SummaryBuilder> {
        WrapperBuilder::new(SummaryBuilder::default())
    }
}

/// Builder for configuring a [`MetricWrapper`].
///
/// Label names are registered in call order, whether they come from
/// [`label_names`](Self::label_names), [`label_name`](Self::label_name) or
/// an extractor; that order is the label vector order of the metric.
///
/// ```rust
/// use huginn::prelude::*;
///
/// let requests = Huginn::counter()
///     .name("requests_total")
///     .help("Requests served")
///     .label_names(["method"])
///     .label_name("region", "unknown")
///     .missing_label_policy(MissingLabelPolicy::Skip)
///     .wrap()?;
///
/// requests.label("method", "GET").inc()?;
/// # Ok::<(), huginn::HuginnError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WrapperBuilder<B> {
    collector: B,
    label_names: LabelNames,
    policy: MissingLabelPolicy,
    extractors: ExtractorMap,
}

impl<B: CollectorBuilder> WrapperBuilder<B> {
    pub fn new(collector: B) -> Self {
        Self {
            collector,
            label_names: LabelNames::new(),
            policy: MissingLabelPolicy::default(),
            extractors: ExtractorMap::new(),
        }
    }

    /// Set the metric name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.collector.opts_mut().name = name.into();
        self
    }

    /// Set the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.collector.opts_mut().help = help.into();
        self
    }

    /// Set the namespace prefix.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.collector.opts_mut().namespace = namespace.into();
        self
    }

    /// Set the subsystem prefix.
    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.collector.opts_mut().subsystem = subsystem.into();
        self
    }

    /// Set the unit reported with the description.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.collector.opts_mut().unit = Some(unit);
        self
    }

    /// Register label names without defaults.
    pub fn label_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_names.add_names(names);
        self
    }

    /// Register a label name with a default value.
    pub fn label_name(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.label_names.insert(name.into(), Some(default.into()));
        self
    }

    /// Register an extractor for `T` with every label name it declares.
    pub fn label_extractor<T, E>(self, extractor: E) -> Self
    where
        T: Any,
        E: LabelExtractor<T> + 'static,
    {
        self.label_extractor_with::<T, E, _, _>(extractor, std::iter::empty::<&str>())
    }

    /// Register an extractor for `T`, limited to `names`.
    ///
    /// Names the extractor does not declare are dropped; an empty `names`
    /// means all declared names. Each kept name takes the extractor's
    /// default. An extractor declaring no names is ignored.
    pub fn label_extractor_with<T, E, I, S>(mut self, extractor: E, names: I) -> Self
    where
        T: Any,
        E: LabelExtractor<T> + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let declared = extractor.target_label_names();
        if declared.is_empty() {
            debug!(
                object = std::any::type_name::<T>(),
                "ignoring extractor without declared label names"
            );
            return self;
        }

        let mut requested: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_owned())
            .collect();
        if requested.is_empty() {
            requested = declared.ordered_names();
        }

        for name in requested {
            if declared.contains(&name) {
                let default = declared.default_for(&name).map(str::to_owned);
                self.label_names.insert(name, default);
            } else {
                debug!(
                    label = %name,
                    object = std::any::type_name::<T>(),
                    "dropping label not declared by extractor"
                );
            }
        }

        self.extractors.bind::<T, E>(extractor);
        self
    }

    /// Set the missing-label policy (default: [`MissingLabelPolicy::Passthrough`]).
    pub fn missing_label_policy(mut self, policy: MissingLabelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Label names registered so far.
    pub fn registered_label_names(&self) -> &LabelNames {
        &self.label_names
    }

    /// Metric metadata configured so far.
    pub fn collector_builder(&self) -> &B {
        &self.collector
    }

    /// Build and register the underlying collector and wrap it.
    ///
    /// Wrapping a clone of the same builder again registers the collector
    /// again; whether that is allowed is up to the metrics backend.
    pub fn wrap(self) -> Result<MetricWrapper<B::Collector>> {
        let collector = self.collector.build(self.label_names.ordered_names())?;
        Ok(MetricWrapper::new(
            collector,
            self.label_names,
            self.policy,
            self.extractors,
        ))
    }
}

impl WrapperBuilder<HistogramBuilder> {
    /// Set explicit bucket upper bounds.
    pub fn buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.collector = self.collector.buckets(buckets);
        self
    }

    pub fn linear_buckets(mut self, start: f64, width: f64, count: usize) -> Self {
        self.collector = self.collector.linear_buckets(start, width, count);
        self
    }

    pub fn exponential_buckets(mut self, start: f64, factor: f64, count: usize) -> Self {
        self.collector = self.collector.exponential_buckets(start, factor, count);
        self
    }
}

impl WrapperBuilder<SummaryBuilder> {
    /// Track `quantile` with tolerated rank `error`.
    pub fn quantile(mut self, quantile: f64, error: f64) -> Self {
        self.collector = self.collector.quantile(quantile, error);
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.collector = self.collector.max_age(max_age);
        self
    }

    pub fn age_buckets(mut self, age_buckets: u32) -> Self {
        self.collector = self.collector.age_buckets(age_buckets);
        self
    }
}
