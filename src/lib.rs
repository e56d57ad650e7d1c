//! # pdfscan
//!
//! Scanned-PDF detection and lossless extraction of embedded page images.
//!
//! A document is *scanned* when its pages are full-page pictures of printed
//! material, and *native* when it was composed digitally. Classification
//! samples pages and votes on the density of the image covering each page.
//! Extraction writes every embedded image out without re-encoding it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfscan::{classify_file, extract_images, ExtractOptions};
//!
//! fn main() -> pdfscan::Result<()> {
//!     let result = classify_file("book.pdf")?;
//!     if let Some(dpi) = result.resolution() {
//!         println!("scanned at {} dpi", dpi);
//!
//!         let options = ExtractOptions::new()
//!             .with_output_dir("out")
//!             .with_prefix_from("book.pdf");
//!         let report = extract_images("book.pdf", &options)?;
//!         println!("{} images written", report.extracted);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Policies**: lenient random sampling, content-stream counting, strict
//!   first-pages sampling
//! - **Lossless output**: CCITT fax data wrapped in TIFF, Flate/LZW/RunLength
//!   images as uncompressed TIFF, JPEG and JPEG2000 copied byte for byte
//! - **Report output**: JSON and the semicolon-separated report line

pub mod backend;
pub mod classify;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;

// Re-export commonly used types
pub use backend::{DocumentModel, LopdfModel};
pub use classify::{
    ClassificationResult, ClassifyPolicy, ImageDiscovery, JsonFormat, PageImageRule,
    SamplingMode, ScanClassifier, Verdict, REPORT_HEADER,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{extract_document, ContainerKind, ExtractOptions, ExtractionReport};
pub use model::{Dimension, DpiHistogram, ImageMetadata, PageSample, Resolution};

use std::path::Path;

/// Classify a PDF file with the default (lenient) policy.
///
/// # Example
///
/// ```no_run
/// use pdfscan::classify_file;
///
/// let result = classify_file("document.pdf").unwrap();
/// println!("scanned: {}", result.is_scan());
/// ```
pub fn classify_file<P: AsRef<Path>>(path: P) -> Result<ClassificationResult> {
    ScanClassifier::default().classify_file(path)
}

/// Classify a PDF file with a custom policy.
///
/// # Example
///
/// ```no_run
/// use pdfscan::{classify_file_with_policy, ClassifyPolicy};
///
/// let result = classify_file_with_policy("book.pdf", ClassifyPolicy::strict()).unwrap();
/// ```
pub fn classify_file_with_policy<P: AsRef<Path>>(
    path: P,
    policy: ClassifyPolicy,
) -> Result<ClassificationResult> {
    ScanClassifier::new(policy).classify_file(path)
}

/// Classify a PDF held in memory.
pub fn classify_bytes(data: &[u8], policy: ClassifyPolicy) -> Result<ClassificationResult> {
    let model = LopdfModel::load_bytes(data, "<memory>")?;
    ScanClassifier::new(policy).classify(&model)
}

/// Classify a PDF file, turning any failure into an invalid result.
pub fn detect_file<P: AsRef<Path>>(path: P) -> ClassificationResult {
    ScanClassifier::default().detect_file(path)
}

/// Extract every image of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfscan::{extract_images, ExtractOptions};
///
/// let options = ExtractOptions::new().with_output_dir("images");
/// let report = extract_images("scan.pdf", &options).unwrap();
/// for path in &report.outputs {
///     println!("{}", path.display());
/// }
/// ```
pub fn extract_images<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    extract::extract_file(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bytes_rejects_garbage() {
        assert!(classify_bytes(b"hello world", ClassifyPolicy::default()).is_err());
    }
}
