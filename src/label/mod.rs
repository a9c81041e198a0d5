//! Label names, per-call label sets, extraction and resolution.

mod extractor;
mod names;
mod policy;
mod set;

pub use extractor::{ExtractorMap, FnExtractor, LabelExtractor, from_fn};
pub use names::LabelNames;
pub use policy::{MissingLabelPolicy, missing_names, resolve_values, should_skip};
pub use set::LabelSet;
