//! Extraction options and report.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Options for extracting the images of a document.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory receiving the output files
    pub output_dir: PathBuf,

    /// File name prefix, outputs are `{prefix}_{index:03}.{suffix}`
    pub prefix: String,

    /// Index of the first extracted image
    pub first_index: usize,

    /// Producer written when the document has none
    pub default_producer: Option<String>,
}

impl ExtractOptions {
    /// Create extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use the stem of `path` as prefix (`book.pdf` gives `book`).
    pub fn with_prefix_from(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(stem) = path.as_ref().file_stem() {
            self.prefix = stem.to_string_lossy().into_owned();
        }
        self
    }

    /// Set the index of the first image.
    pub fn with_first_index(mut self, index: usize) -> Self {
        self.first_index = index;
        self
    }

    /// Set the fallback producer.
    pub fn with_default_producer(mut self, producer: impl Into<String>) -> Self {
        self.default_producer = Some(producer.into());
        self
    }

    /// Output path for an image.
    pub fn output_path(&self, index: usize, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:03}.{}", self.prefix, index, suffix))
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: "image".to_string(),
            first_index: 1,
            default_producer: None,
        }
    }
}

/// Outcome of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Images written
    pub extracted: usize,
    /// Images whose container could not be written
    pub failed: usize,
    /// Images with no supported container
    pub skipped: usize,
    /// Written files, in extraction order
    pub outputs: Vec<PathBuf>,
}

impl ExtractionReport {
    /// Images seen in total.
    pub fn total(&self) -> usize {
        self.extracted + self.failed + self.skipped
    }
}
