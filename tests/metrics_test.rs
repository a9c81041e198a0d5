//! Tests for the `metrics` facade backed collectors.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use metrics::Unit;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use huginn::collector::Collector;
use huginn::prelude::*;
use huginn::{HuginnError, from_fn};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Run `f` against a fresh local recorder and return what it captured.
fn capture<T>(f: impl FnOnce() -> T) -> (T, SnapshotVec) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let output = metrics::with_local_recorder(&recorder, f);
    (output, snapshotter.snapshot().into_vec())
}

fn entries<'a>(
    snapshot: &'a SnapshotVec,
    kind: MetricKind,
    name: &str,
) -> Vec<&'a (
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)> {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == kind && key.key().name() == name)
        .collect()
}

fn labels_of(key: &metrics_util::CompositeKey) -> Vec<(String, String)> {
    key.key()
        .labels()
        .map(|label| (label.key().to_string(), label.value().to_string()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Value of the counter carrying exactly `labels`.
fn counter_value(snapshot: &SnapshotVec, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
    entries(snapshot, MetricKind::Counter, name)
        .into_iter()
        .find(|(key, _, _, _)| labels_of(key) == pairs(labels))
        .and_then(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => Some(*v),
            _ => None,
        })
}

// ============================================================================
// Counters
// ============================================================================

#[test]
fn counter_emits_labels_in_registered_order() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let requests = Huginn::counter()
            .name("requests_total")
            .label_names(["method"])
            .label_name("region", "eu")
            .wrap()?;

        requests.label("method", "GET").inc()?;
        requests.label("method", "GET").inc_by(2)?;
        requests.label("region", "us").label("method", "PUT").inc()?;
        Ok(())
    });
    result.unwrap();

    assert_eq!(
        counter_value(
            &snapshot,
            "requests_total",
            &[("method", "GET"), ("region", "eu")]
        ),
        Some(3)
    );
    assert_eq!(
        counter_value(
            &snapshot,
            "requests_total",
            &[("method", "PUT"), ("region", "us")]
        ),
        Some(1)
    );
}

#[test]
fn counter_without_labels_uses_bare_key() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let started = Huginn::counter().name("started_total").wrap()?;
        started.inc()?;
        started.absolute(10)?;
        Ok(())
    });
    result.unwrap();

    assert_eq!(counter_value(&snapshot, "started_total", &[]), Some(10));
}

#[test]
fn namespace_and_subsystem_prefix_the_name() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let errors = Huginn::counter()
            .namespace("shop")
            .subsystem("http")
            .name("errors_total")
            .wrap()?;
        assert_eq!(errors.collector().name(), "shop_http_errors_total");
        errors.inc()?;
        Ok(())
    });
    result.unwrap();

    assert_eq!(counter_value(&snapshot, "shop_http_errors_total", &[]), Some(1));
}

#[test]
fn help_and_unit_are_described() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let bytes = Huginn::counter()
            .name("sent_bytes_total")
            .help("Bytes sent")
            .unit(Unit::Bytes)
            .wrap()?;
        bytes.inc_by(512)?;
        Ok(())
    });
    result.unwrap();

    let found = entries(&snapshot, MetricKind::Counter, "sent_bytes_total");
    assert_eq!(found.len(), 1);
    let (_, unit, description, _) = found[0];
    assert_eq!(*unit, Some(Unit::Bytes));
    assert_eq!(description.as_deref(), Some("Bytes sent"));
}

// ============================================================================
// Policies on the real backend
// ============================================================================

#[test]
fn passthrough_short_vector_records_nothing() {
    let (result, snapshot) = capture(|| {
        let requests = Huginn::counter()
            .name("requests_total")
            .label_names(["method", "status"])
            .wrap()
            .unwrap();
        requests.label("method", "GET").inc()
    });

    let err = result.unwrap_err();
    assert!(err.is_emission_error());
    assert!(matches!(
        err,
        HuginnError::InconsistentCardinality {
            expected: 2,
            got: 1,
            ..
        }
    ));
    assert!(entries(&snapshot, MetricKind::Counter, "requests_total").is_empty());
}

#[test]
fn skip_records_nothing_until_labels_resolve() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let requests = Huginn::counter()
            .name("requests_total")
            .label_names(["method", "status"])
            .missing_label_policy(MissingLabelPolicy::Skip)
            .wrap()?;

        requests.label("method", "GET").inc()?;
        requests.inc()?;
        requests.label("method", "GET").label("status", 200).inc()?;
        Ok(())
    });
    result.unwrap();

    let found = entries(&snapshot, MetricKind::Counter, "requests_total");
    assert_eq!(found.len(), 1);
    assert_eq!(
        counter_value(
            &snapshot,
            "requests_total",
            &[("method", "GET"), ("status", "200")]
        ),
        Some(1)
    );
}

#[test]
fn fill_empty_records_empty_values() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let requests = Huginn::counter()
            .name("requests_total")
            .label_names(["method", "status"])
            .missing_label_policy(MissingLabelPolicy::FillEmpty)
            .wrap()?;
        requests.label("status", 404).inc()?;
        Ok(())
    });
    result.unwrap();

    assert_eq!(
        counter_value(
            &snapshot,
            "requests_total",
            &[("method", ""), ("status", "404")]
        ),
        Some(1)
    );
}

#[test]
fn extracted_labels_reach_the_backend() {
    struct Job {
        queue: &'static str,
    }

    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let jobs = Huginn::counter()
            .name("jobs_total")
            .label_extractor(from_fn(
                LabelNames::new().names(["queue"]),
                |job: &Job| LabelSet::new().label("queue", job.queue),
            ))
            .wrap()?;
        jobs.label_from(&Job { queue: "mail" }).inc()?;
        Ok(())
    });
    result.unwrap();

    assert_eq!(
        counter_value(&snapshot, "jobs_total", &[("queue", "mail")]),
        Some(1)
    );
}

// ============================================================================
// Gauges
// ============================================================================

#[test]
fn gauge_set_inc_dec() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let in_flight = Huginn::gauge()
            .name("in_flight")
            .label_names(["pool"])
            .wrap()?;
        in_flight.label("pool", "db").set(5.0)?;
        in_flight.label("pool", "db").inc()?;
        in_flight.label("pool", "db").dec_by(3.0)?;
        Ok(())
    });
    result.unwrap();

    let found = entries(&snapshot, MetricKind::Gauge, "in_flight");
    assert_eq!(found.len(), 1);
    assert_eq!(labels_of(&found[0].0), pairs(&[("pool", "db")]));
    match &found[0].3 {
        DebugValue::Gauge(v) => assert_eq!(v.into_inner(), 3.0),
        other => panic!("expected gauge, got {other:?}"),
    }
}

#[test]
fn gauge_set_to_current_time() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let heartbeat = Huginn::gauge().name("last_heartbeat_seconds").wrap()?;
        heartbeat.set_to_current_time()?;
        Ok(())
    });
    result.unwrap();

    let found = entries(&snapshot, MetricKind::Gauge, "last_heartbeat_seconds");
    match &found[0].3 {
        DebugValue::Gauge(v) => assert!(v.into_inner() > 1_600_000_000.0),
        other => panic!("expected gauge, got {other:?}"),
    }
}

// ============================================================================
// Histograms and summaries
// ============================================================================

#[test]
fn histogram_observe_and_time() {
    let (result, snapshot) = capture(|| -> huginn::Result<u32> {
        let latency = Huginn::histogram()
            .name("request_duration_seconds")
            .label_names(["route"])
            .wrap()?;
        latency.label("route", "/").observe(0.25)?;
        latency.label("route", "/").time(|| 7)
    });
    assert_eq!(result.unwrap(), 7);

    let found = entries(&snapshot, MetricKind::Histogram, "request_duration_seconds");
    assert_eq!(found.len(), 1);
    assert_eq!(labels_of(&found[0].0), pairs(&[("route", "/")]));
    match &found[0].3 {
        DebugValue::Histogram(values) => {
            assert_eq!(values.len(), 2);
            assert!(values.iter().any(|v| v.into_inner() == 0.25));
        }
        other => panic!("expected histogram, got {other:?}"),
    }
}

#[test]
fn histogram_keeps_configured_buckets() {
    let latency = Huginn::histogram()
        .name("latency_seconds")
        .buckets([0.1, 0.5, 1.0, f64::INFINITY])
        .wrap()
        .unwrap();
    assert_eq!(latency.collector().buckets(), &[0.1, 0.5, 1.0]);

    let linear = Huginn::histogram()
        .name("size_bytes")
        .linear_buckets(100.0, 100.0, 3)
        .wrap()
        .unwrap();
    assert_eq!(linear.collector().buckets(), &[100.0, 200.0, 300.0]);

    let exponential = Huginn::histogram()
        .name("batch_size")
        .exponential_buckets(1.0, 2.0, 4)
        .wrap()
        .unwrap();
    assert_eq!(exponential.collector().buckets(), &[1.0, 2.0, 4.0, 8.0]);
}

#[test]
fn summary_observations_record_as_histogram() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let sizes = Huginn::summary()
            .name("payload_bytes")
            .quantile(0.5, 0.05)
            .quantile(0.99, 0.001)
            .label_names(["kind"])
            .wrap()?;
        assert_eq!(sizes.collector().quantiles(), &[(0.5, 0.05), (0.99, 0.001)]);
        sizes.label("kind", "json").observe(1024.0)?;
        Ok(())
    });
    result.unwrap();

    let found = entries(&snapshot, MetricKind::Histogram, "payload_bytes");
    assert_eq!(found.len(), 1);
    assert_eq!(labels_of(&found[0].0), pairs(&[("kind", "json")]));
}

#[test]
fn skipped_timer_records_nothing() {
    let (result, snapshot) = capture(|| -> huginn::Result<()> {
        let latency = Huginn::histogram()
            .name("request_duration_seconds")
            .label_names(["route"])
            .missing_label_policy(MissingLabelPolicy::Skip)
            .wrap()?;
        let timer = latency.start_timer()?;
        timer.observe_duration();
        Ok(())
    });
    result.unwrap();

    assert!(entries(&snapshot, MetricKind::Histogram, "request_duration_seconds").is_empty());
}

// ============================================================================
// Build errors
// ============================================================================

#[test]
fn invalid_names_are_rejected() {
    let err = Huginn::counter().name("9lives").wrap().unwrap_err();
    assert!(matches!(err, HuginnError::InvalidMetricName(_)));

    let err = Huginn::counter().wrap().unwrap_err();
    assert!(matches!(err, HuginnError::InvalidMetricName(_)));

    let err = Huginn::counter()
        .name("requests_total")
        .label_names(["bad-label"])
        .wrap()
        .unwrap_err();
    assert!(matches!(err, HuginnError::InvalidLabelName { .. }));
}

#[test]
fn reserved_labels_are_rejected() {
    let err = Huginn::histogram()
        .name("latency_seconds")
        .label_names(["le"])
        .wrap()
        .unwrap_err();
    assert!(matches!(
        err,
        HuginnError::ReservedLabelName {
            kind: "histogram",
            ..
        }
    ));

    let err = Huginn::summary()
        .name("payload_bytes")
        .label_names(["quantile"])
        .wrap()
        .unwrap_err();
    assert!(matches!(
        err,
        HuginnError::ReservedLabelName { kind: "summary", .. }
    ));

    // "le" is only reserved for histograms
    assert!(
        Huginn::counter()
            .name("le_total")
            .label_names(["le"])
            .wrap()
            .is_ok()
    );
}

#[test]
fn invalid_buckets_are_rejected() {
    for buckets in [vec![], vec![1.0, 1.0], vec![2.0, 1.0], vec![f64::NAN]] {
        let err = Huginn::histogram()
            .name("latency_seconds")
            .buckets(buckets)
            .wrap()
            .unwrap_err();
        assert!(matches!(err, HuginnError::InvalidBuckets(_)));
    }
}

#[test]
fn invalid_summary_shape_is_rejected() {
    let err = Huginn::summary()
        .name("payload_bytes")
        .quantile(1.5, 0.01)
        .wrap()
        .unwrap_err();
    assert!(matches!(err, HuginnError::InvalidQuantile { .. }));

    let err = Huginn::summary()
        .name("payload_bytes")
        .age_buckets(0)
        .wrap()
        .unwrap_err();
    assert!(matches!(err, HuginnError::Configuration(_)));
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let requests = Huginn::counter()
        .name("requests_total")
        .help("Requests served")
        .label_names(["method"])
        .wrap()
        .unwrap();
    requests.label("method", "GET").inc().unwrap();
}
