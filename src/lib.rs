//! Huginn - Declarative, type-driven label resolution for metrics
//!
//! Instead of assembling an ordered label-value array for every emission,
//! callers attach typed objects and ad-hoc key/value pairs. Huginn resolves
//! them into the exact label vector the metric was registered with,
//! substituting defaults and applying a [`MissingLabelPolicy`] to labels
//! nobody supplied.
//!
//! Metrics are emitted through the [`metrics`] facade. Consumers install
//! their own recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Example
//!
//! ```rust
//! use huginn::prelude::*;
//!
//! struct Request {
//!     method: &'static str,
//!     tenant: Option<String>,
//! }
//!
//! struct RequestLabels;
//!
//! impl LabelExtractor<Request> for RequestLabels {
//!     fn extract_labels(&self, request: &Request) -> LabelSet {
//!         LabelSet::new()
//!             .label("method", request.method)
//!             .label_opt("tenant", request.tenant.as_deref())
//!     }
//!
//!     fn target_label_names(&self) -> LabelNames {
//!         LabelNames::new().names(["method"]).name("tenant", "anonymous")
//!     }
//! }
//!
//! fn main() -> huginn::Result<()> {
//!     let requests = Huginn::counter()
//!         .name("requests_total")
//!         .help("Requests served")
//!         .label_extractor(RequestLabels)
//!         .label_names(["status"])
//!         .missing_label_policy(MissingLabelPolicy::Skip)
//!         .wrap()?;
//!
//!     let request = Request { method: "GET", tenant: None };
//!
//!     // method="GET", tenant="anonymous", status="200"
//!     requests.label_from(&request).label("status", 200).inc()?;
//!
//!     // No status: skipped, nothing is recorded.
//!     requests.label_from(&request).inc()?;
//!     Ok(())
//! }
//! ```

pub mod collector;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod label;
pub mod wrapper;

// Re-export main types at crate root
pub use error::{HuginnError, Result};
pub use label::{
    ExtractorMap, FnExtractor, LabelExtractor, LabelNames, LabelSet, MissingLabelPolicy, from_fn,
};
pub use wrapper::{
    CounterWrapper, GaugeWrapper, HistogramWrapper, Huginn, LabelScope, MetricWrapper,
    SummaryWrapper, WrapperBuilder,
};

#[cfg(feature = "config")]
pub use config::{MetricDef, MetricKind, MetricsConfig};

/// Everything needed to declare and emit metrics.
pub mod prelude {
    pub use crate::wrapper::{CounterOps, GaugeOps, ObserveOps, ReadOps, TimerOps};
    pub use crate::{
        Huginn, LabelExtractor, LabelNames, LabelSet, MetricWrapper, MissingLabelPolicy,
    };
}
