use std::sync::Arc;

use metrics::Histogram;
use tracing::debug;

use super::{
    Collector, CollectorBuilder, Desc, Kind, MetricOpts, ObserveChild, TimerSink, describe,
};
use crate::{HuginnError, Result};

/// Default bucket upper bounds, in seconds.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Builder for [`HistogramVec`].
///
/// Buckets are not applied by the `metrics` facade itself; they travel on
/// the built [`HistogramVec`] so the exporter can be configured with them.
#[derive(Debug, Clone)]
pub struct HistogramBuilder {
    opts: MetricOpts,
    buckets: Vec<f64>,
}

impl Default for HistogramBuilder {
    fn default() -> Self {
        Self {
            opts: MetricOpts::default(),
            buckets: DEFAULT_BUCKETS.to_vec(),
        }
    }
}

impl HistogramBuilder {
    /// Set explicit bucket upper bounds. A trailing `+Inf` is implicit.
    pub fn buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.buckets = buckets.into();
        self
    }

    /// `count` buckets starting at `start`, each `width` apart.
    pub fn linear_buckets(mut self, start: f64, width: f64, count: usize) -> Self {
        self.buckets = (0..count).map(|i| start + width * i as f64).collect();
        self
    }

    /// `count` buckets starting at `start`, each `factor` times the previous.
    pub fn exponential_buckets(mut self, start: f64, factor: f64, count: usize) -> Self {
        self.buckets = std::iter::successors(Some(start), |b| Some(b * factor))
            .take(count)
            .collect();
        self
    }

    fn validated_buckets(&self) -> Result<Vec<f64>> {
        let mut buckets = self.buckets.clone();
        if buckets.last() == Some(&f64::INFINITY) {
            buckets.pop();
        }
        if buckets.is_empty() {
            return Err(HuginnError::InvalidBuckets(
                "at least one finite bucket is required".into(),
            ));
        }
        if buckets.iter().any(|b| b.is_nan()) {
            return Err(HuginnError::InvalidBuckets("buckets must not be NaN".into()));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HuginnError::InvalidBuckets(format!(
                "buckets must be strictly increasing: {buckets:?}"
            )));
        }
        Ok(buckets)
    }
}

impl CollectorBuilder for HistogramBuilder {
    type Collector = HistogramVec;

    fn opts(&self) -> &MetricOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut MetricOpts {
        &mut self.opts
    }

    fn build(&self, label_names: Vec<String>) -> Result<HistogramVec> {
        let name = self.opts.validate(&label_names, &["le"], "histogram")?;
        let buckets = self.validated_buckets()?;
        describe(Kind::Histogram, &name, &self.opts);
        debug!(metric = %name, labels = ?label_names, buckets = buckets.len(), "registered histogram");
        Ok(HistogramVec {
            desc: Desc::new(name, label_names),
            buckets: buckets.into(),
        })
    }
}

/// Histogram family on the `metrics` facade.
#[derive(Debug, Clone)]
pub struct HistogramVec {
    desc: Arc<Desc>,
    buckets: Arc<[f64]>,
}

impl HistogramVec {
    /// Bucket upper bounds, without the implicit `+Inf`.
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }
}

impl Collector for HistogramVec {
    type Child = HistogramHandle;

    fn name(&self) -> &str {
        &self.desc.name
    }

    fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    fn unlabeled(&self) -> Result<HistogramHandle> {
        self.with_label_values(&[])
    }

    fn with_label_values(&self, values: &[String]) -> Result<HistogramHandle> {
        let labels = self.desc.labels(values)?;
        Ok(HistogramHandle(metrics::histogram!(
            self.desc.name.clone(),
            labels
        )))
    }

    fn detached(&self) -> HistogramHandle {
        HistogramHandle(Histogram::noop())
    }
}

/// Histogram bound to one label vector.
#[derive(Clone)]
pub struct HistogramHandle(Histogram);

impl ObserveChild for HistogramHandle {
    fn observe(&self, value: f64) {
        self.0.record(value);
    }
}

impl TimerSink for HistogramHandle {
    fn record_seconds(&self, seconds: f64) {
        self.0.record(seconds);
    }
}
