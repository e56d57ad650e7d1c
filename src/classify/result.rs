//! Classification outcome and its report forms.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Header of the semicolon-separated report.
pub const REPORT_HEADER: &str = "FILENAME;PROCESSING TIME;VALID;NB PAGES;NB IMAGES;TYPE;RESOLUTION";

/// Terminal state of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verdict {
    /// The document could not be read
    Invalid,
    /// Digitally composed content
    Native,
    /// Full-page scans at the given resolution (bucketed dpi)
    Scanned { resolution: u32 },
}

/// Result of classifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether the document could be walked
    pub valid: bool,
    /// Number of pages (`P`)
    pub page_count: usize,
    /// Number of images found (`I`)
    pub image_count: usize,
    /// Outcome
    pub verdict: Verdict,
    /// Wall-clock time spent, in milliseconds
    pub elapsed_ms: u64,
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

impl ClassificationResult {
    /// Result of a valid document.
    pub fn new(page_count: usize, image_count: usize, verdict: Verdict) -> Self {
        Self {
            valid: !matches!(verdict, Verdict::Invalid),
            page_count,
            image_count,
            verdict,
            elapsed_ms: 0,
        }
    }

    /// Result of a document that could not be read.
    pub fn invalid() -> Self {
        Self::new(0, 0, Verdict::Invalid)
    }

    /// Set the elapsed time.
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Whether the document was classified as scanned.
    pub fn is_scan(&self) -> bool {
        matches!(self.verdict, Verdict::Scanned { .. })
    }

    /// Resolution of a scanned document.
    pub fn resolution(&self) -> Option<u32> {
        match self.verdict {
            Verdict::Scanned { resolution } => Some(resolution),
            _ => None,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };
        result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
    }

    /// One line of the semicolon-separated report, see [`REPORT_HEADER`].
    pub fn report_line(&self, name: &str) -> String {
        match self.verdict {
            Verdict::Invalid => format!("{};{};not valid", name, self.elapsed_ms),
            Verdict::Native => format!(
                "{};{};valid;{};{};native pdf",
                name, self.elapsed_ms, self.page_count, self.image_count
            ),
            Verdict::Scanned { resolution } => format!(
                "{};{};valid;{};{};scanned pdf;{}",
                name, self.elapsed_ms, self.page_count, self.image_count, resolution
            ),
        }
    }
}
