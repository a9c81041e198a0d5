//! Metric declarations loaded from TOML.
//!
//! Declarations are loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`)
//! 2. `~/.huginn/metrics.toml` (user)
//! 3. `/etc/huginn/metrics.toml` (system)
//!
//! ```toml
//! [[metric]]
//! kind = "counter"
//! name = "requests_total"
//! namespace = "shop"
//! help = "Requests served"
//! policy = "skip"
//! labels = ["method", { name = "region", default = "unknown" }]
//!
//! [[metric]]
//! kind = "histogram"
//! name = "request_duration_seconds"
//! labels = ["method"]
//! buckets = [0.01, 0.1, 1.0]
//! ```
//!
//! Extractors are code, not configuration: add them to the builder returned
//! by [`MetricDef::counter_builder`] and friends.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collector::{
    CollectorBuilder, CounterBuilder, GaugeBuilder, HistogramBuilder, MetricOpts, SummaryBuilder,
};
use crate::label::MissingLabelPolicy;
use crate::wrapper::{Huginn, WrapperBuilder};
use crate::{HuginnError, Result};

/// A file of metric declarations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    #[serde(default, rename = "metric")]
    pub metrics: Vec<MetricDef>,
}

/// Metric kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// One declared metric.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricDef {
    pub kind: MetricKind,
    pub name: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub subsystem: String,
    /// Missing-label policy (default: passthrough).
    #[serde(default)]
    pub policy: MissingLabelPolicy,
    /// Label names in vector order.
    #[serde(default)]
    pub labels: Vec<LabelDef>,
    /// Histogram bucket upper bounds.
    #[serde(default)]
    pub buckets: Option<Vec<f64>>,
    /// Summary quantiles.
    #[serde(default)]
    pub quantiles: Vec<QuantileDef>,
    /// Summary sliding window length in seconds.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
    /// Summary sliding window bucket count.
    #[serde(default)]
    pub age_buckets: Option<u32>,
}

/// A label name, bare or with a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelDef {
    Name(String),
    WithDefault {
        name: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl LabelDef {
    pub fn name(&self) -> &str {
        match self {
            LabelDef::Name(name) | LabelDef::WithDefault { name, .. } => name,
        }
    }

    pub fn default_value(&self) -> Option<&str> {
        match self {
            LabelDef::Name(_) => None,
            LabelDef::WithDefault { default, .. } => default.as_deref(),
        }
    }
}

/// A summary quantile and its tolerated rank error.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantileDef {
    pub quantile: f64,
    pub error: f64,
}

impl MetricsConfig {
    /// Load declarations from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.huginn/metrics.toml`
    /// 3. `/etc/huginn/metrics.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        Self::from_file(&path)
    }

    /// Load declarations from one file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HuginnError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("metrics.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/huginn/metrics.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(HuginnError::Configuration(
            "No config file found. Create ~/.huginn/metrics.toml or /etc/huginn/metrics.toml"
                .to_string(),
        ))
    }

    /// Find a declaration by its (unqualified) name.
    pub fn get(&self, name: &str) -> Option<&MetricDef> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Check the declarations as a whole.
    ///
    /// Rejects duplicate fully-qualified names and shape options given to
    /// the wrong kind. Names, labels, buckets and quantiles themselves are
    /// checked when a metric is wrapped.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for metric in &self.metrics {
            let fq_name = metric.fq_name();
            if !seen.insert(fq_name.clone()) {
                return Err(HuginnError::Configuration(format!(
                    "metric '{fq_name}' is declared more than once"
                )));
            }
            metric.validate_shape()?;
        }
        Ok(())
    }
}

impl MetricDef {
    /// `namespace_subsystem_name`, as the built collector will report it.
    pub fn fq_name(&self) -> String {
        MetricOpts {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            subsystem: self.subsystem.clone(),
            ..Default::default()
        }
        .fq_name()
    }

    /// Builder configured from a counter declaration.
    pub fn counter_builder(&self) -> Result<WrapperBuilder<CounterBuilder>> {
        self.expect_kind(MetricKind::Counter)?;
        Ok(self.apply(Huginn::counter()))
    }

    /// Builder configured from a gauge declaration.
    pub fn gauge_builder(&self) -> Result<WrapperBuilder<GaugeBuilder>> {
        self.expect_kind(MetricKind::Gauge)?;
        Ok(self.apply(Huginn::gauge()))
    }

    /// Builder configured from a histogram declaration.
    pub fn histogram_builder(&self) -> Result<WrapperBuilder<HistogramBuilder>> {
        self.expect_kind(MetricKind::Histogram)?;
        let mut builder = self.apply(Huginn::histogram());
        if let Some(buckets) = &self.buckets {
            builder = builder.buckets(buckets.clone());
        }
        Ok(builder)
    }

    /// Builder configured from a summary declaration.
    pub fn summary_builder(&self) -> Result<WrapperBuilder<SummaryBuilder>> {
        self.expect_kind(MetricKind::Summary)?;
        let mut builder = self.apply(Huginn::summary());
        for q in &self.quantiles {
            builder = builder.quantile(q.quantile, q.error);
        }
        if let Some(secs) = self.max_age_secs {
            builder = builder.max_age(Duration::from_secs(secs));
        }
        if let Some(age_buckets) = self.age_buckets {
            builder = builder.age_buckets(age_buckets);
        }
        Ok(builder)
    }

    fn apply<B: CollectorBuilder>(&self, builder: WrapperBuilder<B>) -> WrapperBuilder<B> {
        let mut builder = builder
            .name(self.name.as_str())
            .help(self.help.as_str())
            .namespace(self.namespace.as_str())
            .subsystem(self.subsystem.as_str())
            .missing_label_policy(self.policy);
        for label in &self.labels {
            builder = match label.default_value() {
                Some(default) => builder.label_name(label.name(), default),
                None => builder.label_names([label.name()]),
            };
        }
        builder
    }

    fn expect_kind(&self, kind: MetricKind) -> Result<()> {
        if self.kind != kind {
            return Err(HuginnError::Configuration(format!(
                "metric '{}' is declared as a {}, not a {kind}",
                self.name, self.kind
            )));
        }
        Ok(())
    }

    fn validate_shape(&self) -> Result<()> {
        const SUMMARY_SHAPE: &str = "quantiles/max_age_secs/age_buckets";
        let misplaced = match self.kind {
            MetricKind::Histogram => self.has_summary_shape().then_some(SUMMARY_SHAPE),
            MetricKind::Summary => self.buckets.is_some().then_some("buckets"),
            MetricKind::Counter | MetricKind::Gauge => {
                if self.buckets.is_some() {
                    Some("buckets")
                } else {
                    self.has_summary_shape().then_some(SUMMARY_SHAPE)
                }
            }
        };
        match misplaced {
            Some(option) => Err(HuginnError::Configuration(format!(
                "metric '{}' is a {} and cannot take {option}",
                self.name, self.kind
            ))),
            None => Ok(()),
        }
    }

    fn has_summary_shape(&self) -> bool {
        !self.quantiles.is_empty() || self.max_age_secs.is_some() || self.age_buckets.is_some()
    }
}
