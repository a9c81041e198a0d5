//! huginn-lint: check metric declarations.
//!
//! Loads a metrics config, builds every declared metric, and prints its
//! label layout. Exits non-zero when any declaration fails to build.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

use huginn::collector::CollectorBuilder;
use huginn::{HuginnError, LabelNames, MetricDef, MetricKind, MetricsConfig, WrapperBuilder};

/// Check huginn metric declarations.
#[derive(Parser)]
#[command(name = "huginn-lint")]
#[command(version)]
#[command(about = "Check huginn metric declarations")]
struct Args {
    /// Path to the metrics config (default: ~/.huginn/metrics.toml, then /etc/huginn/metrics.toml).
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = match MetricsConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(metrics = config.metrics.len(), "loaded metric declarations");

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;
    for metric in &config.metrics {
        match lint(metric) {
            Ok(names) => println!(
                "{:<10} {:<40} {:<12} {}",
                metric.kind.to_string(),
                metric.fq_name(),
                format!("{:?}", metric.policy).to_lowercase(),
                render_labels(&names)
            ),
            Err(e) => {
                warn!(metric = %metric.fq_name(), error = %e, "metric failed to build");
                eprintln!("error: {}: {e}", metric.fq_name());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} metrics failed", config.metrics.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Build one declaration and return its resolved label names.
fn lint(metric: &MetricDef) -> Result<LabelNames, HuginnError> {
    match metric.kind {
        MetricKind::Counter => wrapped_names(metric.counter_builder()?),
        MetricKind::Gauge => wrapped_names(metric.gauge_builder()?),
        MetricKind::Histogram => wrapped_names(metric.histogram_builder()?),
        MetricKind::Summary => wrapped_names(metric.summary_builder()?),
    }
}

fn wrapped_names<B: CollectorBuilder>(builder: WrapperBuilder<B>) -> Result<LabelNames, HuginnError> {
    Ok(builder.wrap()?.label_names().clone())
}

fn render_labels(names: &LabelNames) -> String {
    if names.is_empty() {
        return "-".to_string();
    }
    names
        .iter()
        .map(|(name, default)| match default {
            Some(default) => format!("{name}={default:?}"),
            None => name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
