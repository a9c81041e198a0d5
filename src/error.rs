//! Huginn error types

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Emission errors
    /// The label vector handed to a collector does not match its label names.
    ///
    /// Under [`MissingLabelPolicy::Passthrough`](crate::MissingLabelPolicy::Passthrough)
    /// an unresolved label shortens the vector; the collector reports it here
    /// and the wrapper returns it untouched.
    #[error(
        "inconsistent label cardinality for '{metric}': expected {expected} label values, got {got}"
    )]
    InconsistentCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },

    // Construction errors
    #[error("invalid metric name: '{0}'")]
    InvalidMetricName(String),

    #[error("invalid label name '{label}' for metric '{metric}'")]
    InvalidLabelName { metric: String, label: String },

    #[error("label name '{label}' is reserved for {kind} metrics")]
    ReservedLabelName { label: String, kind: &'static str },

    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),

    #[error("invalid quantile {quantile} (error {error}): both must lie within [0, 1]")]
    InvalidQuantile { quantile: f64, error: f64 },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuginnError {
    /// Returns `true` for errors raised while emitting, as opposed to
    /// while building a metric.
    pub fn is_emission_error(&self) -> bool {
        matches!(self, HuginnError::InconsistentCardinality { .. })
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
