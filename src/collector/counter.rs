use std::sync::Arc;

use metrics::Counter;
use tracing::debug;

use super::{Collector, CollectorBuilder, CounterChild, Desc, Kind, MetricOpts, describe};
use crate::Result;

/// Builder for [`CounterVec`].
#[derive(Debug, Clone, Default)]
pub struct CounterBuilder {
    opts: MetricOpts,
}

impl CollectorBuilder for CounterBuilder {
    type Collector = CounterVec;

    fn opts(&self) -> &MetricOpts {
        &self.opts
    }

    fn opts_mut(&mut self) -> &mut MetricOpts {
        &mut self.opts
    }

    fn build(&self, label_names: Vec<String>) -> Result<CounterVec> {
        let name = self.opts.validate(&label_names, &[], "counter")?;
        describe(Kind::Counter, &name, &self.opts);
        debug!(metric = %name, labels = ?label_names, "registered counter");
        Ok(CounterVec {
            desc: Desc::new(name, label_names),
        })
    }
}

/// Counter family on the `metrics` facade.
#[derive(Debug, Clone)]
pub struct CounterVec {
    desc: Arc<Desc>,
}

impl Collector for CounterVec {
    type Child = CounterHandle;

    fn name(&self) -> &str {
        &self.desc.name
    }

    fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    fn unlabeled(&self) -> Result<CounterHandle> {
        self.with_label_values(&[])
    }

    fn with_label_values(&self, values: &[String]) -> Result<CounterHandle> {
        let labels = self.desc.labels(values)?;
        Ok(CounterHandle(metrics::counter!(
            self.desc.name.clone(),
            labels
        )))
    }

    fn detached(&self) -> CounterHandle {
        CounterHandle(Counter::noop())
    }
}

/// Counter bound to one label vector.
#[derive(Clone)]
pub struct CounterHandle(Counter);

impl CounterChild for CounterHandle {
    fn increment(&self, value: u64) {
        self.0.increment(value);
    }

    fn absolute(&self, value: u64) {
        self.0.absolute(value);
    }
}
