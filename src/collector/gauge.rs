use std::sync::Arc;

use metrics::Gauge;
use tracing::debug;

use super::{Collector, CollectorBuilder, Desc, GaugeChild, Kind, MetricOpts, TimerSink, describe};
use crate::Result;

/// Builder for [`GaugeVec`].
#[derive(Debug, Clone, Default)]
pub struct GaugeBuilder {
    opts: MetricOpts,
}

impl CollectorBuilder for GaugeBuilder {
    type Collector = GaugeVec;

    fn opts(&self) -> &MetricOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut MetricOpts {
        &mut self.opts
    }

    fn build(&self, label_names: Vec<String>) -> Result<GaugeVec> {
        let name = self.opts.validate(&label_names, &[], "gauge")?;
        describe(Kind::Gauge, &name, &self.opts);
        debug!(metric = %name, labels = ?label_names, "registered gauge");
        Ok(GaugeVec {
            desc: Desc::new(name, label_names),
        })
    }
}

/// Gauge family on the `metrics` facade.
#[derive(Debug, Clone)]
pub struct GaugeVec {
    desc: Arc<Desc>,
}

impl Collector for GaugeVec {
    type Child = GaugeHandle;

    fn name(&self) -> &str {
        &self.desc.name
    }

    fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    fn unlabeled(&self) -> Result<GaugeHandle> {
        self.with_label_values(&[])
    }

    fn with_label_values(&self, values: &[String]) -> Result<GaugeHandle> {
        let labels = self.desc.labels(values)?;
        Ok(GaugeHandle(metrics::gauge!(self.desc.name.clone(), labels)))
    }

    fn detached(&self) -> GaugeHandle {
        GaugeHandle(Gauge::noop())
    }
}

/// Gauge bound to one label vector.
#[derive(Clone)]
pub struct GaugeHandle(Gauge);

impl GaugeChild for GaugeHandle {
    fn increment(&self, value: f64) {
        self.0.increment(value);
    }

    fn decrement(&self, value: f64) {
        self.0.decrement(value);
    }

    fn set(&self, value: f64) {
        self.0.set(value);
    }
}

/// A timed gauge holds the duration of the last timed section.
impl TimerSink for GaugeHandle {
    fn record_seconds(&self, seconds: f64) {
        self.0.set(seconds);
    }
}
