//! Missing-label policy and label vector resolution.

use serde::{Deserialize, Serialize};

use super::{LabelNames, LabelSet};

/// What to do when a registered label has neither a value nor a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLabelPolicy {
    /// Hand the (possibly short) vector to the collector and let it decide.
    ///
    /// The `metrics` backed collectors reject a short vector with
    /// [`HuginnError::InconsistentCardinality`](crate::HuginnError::InconsistentCardinality).
    #[default]
    #[serde(alias = "default")]
    Passthrough,

    /// Substitute an empty string.
    #[serde(alias = "fill_with_empty_string")]
    FillEmpty,

    /// Drop the whole emission.
    Skip,
}

/// Resolve the ordered label vector for one emission.
///
/// Each registered name takes the supplied value, else its default, else
/// `""` under [`MissingLabelPolicy::FillEmpty`]. Names that remain
/// unresolved are left out, so the result may be shorter than `names`.
pub fn resolve_values(
    names: &LabelNames,
    labels: &LabelSet,
    policy: MissingLabelPolicy,
) -> Vec<String> {
    names
        .iter()
        .filter_map(|(name, default)| {
            labels
                .get(name)
                .or(default)
                .or(match policy {
                    MissingLabelPolicy::FillEmpty => Some(""),
                    _ => None,
                })
                .map(str::to_owned)
        })
        .collect()
}

/// Whether an emission must be suppressed under `policy`.
pub fn should_skip(names: &LabelNames, labels: &LabelSet, policy: MissingLabelPolicy) -> bool {
    policy == MissingLabelPolicy::Skip && !missing_names(names, labels).is_empty()
}

/// Registered names with neither a supplied value nor a default.
pub fn missing_names<'a>(names: &'a LabelNames, labels: &LabelSet) -> Vec<&'a str> {
    names
        .iter()
        .filter(|(name, default)| labels.get(name).is_none() && default.is_none())
        .map(|(name, _)| name)
        .collect()
}
