use std::sync::Arc;
use std::time::Duration;

use metrics::Histogram;
use tracing::debug;

use super::{
    Collector, CollectorBuilder, Desc, Kind, MetricOpts, ObserveChild, TimerSink, describe,
};
use crate::{HuginnError, Result};

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);
const DEFAULT_AGE_BUCKETS: u32 = 5;

/// Builder for [`SummaryVec`].
///
/// Summaries record through the histogram facade; quantiles and the
/// sliding window shape travel on the built [`SummaryVec`] for the
/// exporter to apply.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    opts: MetricOpts,
    quantiles: Vec<(f64, f64)>,
    max_age: Duration,
    age_buckets: u32,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self {
            opts: MetricOpts::default(),
            quantiles: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
        }
    }
}

impl SummaryBuilder {
    /// Track `quantile` with tolerated rank `error`.
    pub fn quantile(mut self, quantile: f64, error: f64) -> Self {
        self.quantiles.push((quantile, error));
        self
    }

    /// Length of the sliding window (default: 10 minutes).
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Number of buckets the sliding window rotates through (default: 5).
    pub fn age_buckets(mut self, age_buckets: u32) -> Self {
        self.age_buckets = age_buckets;
        self
    }
}

impl CollectorBuilder for SummaryBuilder {
    type Collector = SummaryVec;

    fn opts(&self) -> &MetricOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut MetricOpts {
        &mut self.opts
    }

    fn build(&self, label_names: Vec<String>) -> Result<SummaryVec> {
        let name = self.opts.validate(&label_names, &["quantile"], "summary")?;
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if let Some(&(quantile, error)) = self
            .quantiles
            .iter()
            .find(|(q, e)| !in_range(*q) || !in_range(*e))
        {
            return Err(HuginnError::InvalidQuantile { quantile, error });
        }
        if self.age_buckets == 0 {
            return Err(HuginnError::Configuration(format!(
                "summary '{name}' needs at least one age bucket"
            )));
        }
        describe(Kind::Histogram, &name, &self.opts);
        debug!(metric = %name, labels = ?label_names, quantiles = ?self.quantiles, "registered summary");
        Ok(SummaryVec {
            desc: Desc::new(name, label_names),
            quantiles: self.quantiles.clone().into(),
            max_age: self.max_age,
            age_buckets: self.age_buckets,
        })
    }
}

/// Summary family on the `metrics` facade.
#[derive(Debug, Clone)]
pub struct SummaryVec {
    desc: Arc<Desc>,
    quantiles: Arc<[(f64, f64)]>,
    max_age: Duration,
    age_buckets: u32,
}

impl SummaryVec {
    /// `(quantile, error)` pairs.
    pub fn quantiles(&self) -> &[(f64, f64)] {
        &self.quantiles
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn age_buckets(&self) -> u32 {
        self.age_buckets
    }
}

impl Collector for SummaryVec {
    type Child = SummaryHandle;

    fn name(&self) -> &str {
        &self.desc.name
    }

    fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    fn unlabeled(&self) -> Result<SummaryHandle> {
        self.with_label_values(&[])
    }

    fn with_label_values(&self, values: &[String]) -> Result<SummaryHandle> {
        let labels = self.desc.labels(values)?;
        Ok(SummaryHandle(metrics::histogram!(
            self.desc.name.clone(),
            labels
        )))
    }

    fn detached(&self) -> SummaryHandle {
        SummaryHandle(Histogram::noop())
    }
}

/// Summary bound to one label vector.
#[derive(Clone)]
pub struct SummaryHandle(Histogram);

impl ObserveChild for SummaryHandle {
    fn observe(&self, value: f64) {
        self.0.record(value);
    }
}

impl TimerSink for SummaryHandle {
    fn record_seconds(&self, seconds: f64) {
        self.0.record(seconds);
    }
}
