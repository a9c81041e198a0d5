//! Underlying metric primitives.
//!
//! [`Collector`] is the narrow contract the wrapper needs from a metric
//! family: a zero-label entry point, a label-vector entry point yielding a
//! bound child, and a detached child that records nothing. What a child
//! can do is expressed by the capability traits in this module; the
//! wrapper enables its terminal operations from them.
//!
//! The families shipped here sit on the [`metrics`] facade. Consumers
//! install their own recorder (e.g. prometheus, statsd); without one, every
//! emission is a no-op.

mod counter;
mod gauge;
mod histogram;
mod summary;
mod timer;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use metrics::{KeyName, Label, SharedString, Unit};

use crate::{HuginnError, Result};

pub use counter::{CounterBuilder, CounterHandle, CounterVec};
pub use gauge::{GaugeBuilder, GaugeHandle, GaugeVec};
pub use histogram::{DEFAULT_BUCKETS, HistogramBuilder, HistogramHandle, HistogramVec};
pub use summary::{SummaryBuilder, SummaryHandle, SummaryVec};
pub use timer::Timer;

/// A metric family addressed by an ordered label vector.
pub trait Collector: Send + Sync {
    /// Handle bound to one label vector.
    type Child;

    /// Fully-qualified metric name.
    fn name(&self) -> &str;

    /// Label names in vector order.
    fn label_names(&self) -> &[String];

    /// Child for an emission without labels.
    fn unlabeled(&self) -> Result<Self::Child>;

    /// Child for the given label values, one per label name.
    fn with_label_values(&self, values: &[String]) -> Result<Self::Child>;

    /// Child that records nothing, used when an emission is skipped.
    fn detached(&self) -> Self::Child;
}

/// Finalizes a [`Collector`] once the label names are known.
pub trait CollectorBuilder {
    type Collector: Collector;

    fn opts(&self) -> &MetricOpts;

    fn opts_mut(&mut self) -> &mut MetricOpts;

    /// Validate, register with the metrics backend, and return the family.
    fn build(&self, label_names: Vec<String>) -> Result<Self::Collector>;
}

/// Monotonic counter child.
pub trait CounterChild {
    fn increment(&self, value: u64);
    fn absolute(&self, value: u64);
}

/// Gauge child.
pub trait GaugeChild {
    fn increment(&self, value: f64);
    fn decrement(&self, value: f64);
    fn set(&self, value: f64);

    /// Set to the current unix time in seconds.
    fn set_to_current_time(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.set(now);
    }
}

/// Distribution child (histograms, summaries).
pub trait ObserveChild {
    fn observe(&self, value: f64);
}

/// Child that can take a duration from a [`Timer`].
pub trait TimerSink {
    fn record_seconds(&self, seconds: f64);
}

/// Child whose current value can be read back.
pub trait ReadChild {
    type Value;

    fn get(&self) -> Self::Value;
}

/// Metadata forwarded to the metrics backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricOpts {
    pub name: String,
    pub help: String,
    pub namespace: String,
    pub subsystem: String,
    pub unit: Option<Unit>,
}

impl MetricOpts {
    /// `namespace_subsystem_name`, skipping empty parts.
    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Validate the metric name and `label_names`, rejecting `reserved`.
    pub(crate) fn validate(
        &self,
        label_names: &[String],
        reserved: &[&str],
        kind: &'static str,
    ) -> Result<String> {
        let fq_name = self.fq_name();
        if self.name.is_empty() || !is_valid_metric_name(&fq_name) {
            return Err(HuginnError::InvalidMetricName(fq_name));
        }
        for label in label_names {
            if !is_valid_label_name(label) {
                return Err(HuginnError::InvalidLabelName {
                    metric: fq_name,
                    label: label.clone(),
                });
            }
            if reserved.contains(&label.as_str()) {
                return Err(HuginnError::ReservedLabelName {
                    label: label.clone(),
                    kind,
                });
            }
        }
        Ok(fq_name)
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, minus the `__` prefix kept for internal use.
fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Name and label layout shared by a family and its clones.
#[derive(Debug)]
pub(crate) struct Desc {
    pub(crate) name: String,
    pub(crate) label_names: Vec<String>,
}

impl Desc {
    pub(crate) fn new(name: String, label_names: Vec<String>) -> Arc<Self> {
        Arc::new(Self { name, label_names })
    }

    /// Pair `values` with the label names, enforcing one value per name.
    pub(crate) fn labels(&self, values: &[String]) -> Result<Vec<Label>> {
        if values.len() != self.label_names.len() {
            return Err(HuginnError::InconsistentCardinality {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        Ok(self
            .label_names
            .iter()
            .zip(values)
            .map(|(name, value)| Label::new(name.clone(), value.clone()))
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Kind {
    Counter,
    Gauge,
    Histogram,
}

/// Hand the description to the installed recorder.
pub(crate) fn describe(kind: Kind, name: &str, opts: &MetricOpts) {
    if opts.help.is_empty() && opts.unit.is_none() {
        return;
    }
    let key = KeyName::from(name.to_owned());
    let help = SharedString::from(opts.help.clone());
    metrics::with_recorder(|recorder| match kind {
        Kind::Counter => recorder.describe_counter(key, opts.unit, help),
        Kind::Gauge => recorder.describe_gauge(key, opts.unit, help),
        Kind::Histogram => recorder.describe_histogram(key, opts.unit, help),
    });
}
