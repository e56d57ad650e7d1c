//! Scanned-versus-native document classification.
//!
//! A document is scanned when most sampled pages carry an image covering the
//! whole page at a consistent density. See [`ScanClassifier`].

mod engine;
mod policy;
mod result;

pub use engine::{decide, pick_samples, ScanClassifier, Survey};
pub use policy::{
    ClassifyPolicy, ImageDiscovery, PageImageRule, SamplingMode, MAX_SAMPLES, THRESHOLD,
};
pub use result::{ClassificationResult, JsonFormat, Verdict, REPORT_HEADER};
