//! Error types for pdfscan library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while classifying documents or extracting images.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document model could not be loaded or walked.
    #[error("Document {name} is unreadable: {reason}")]
    DocumentUnreadable { name: String, reason: String },

    /// A required PDF object is missing.
    #[error("Missing required object: {0}")]
    MissingObject(String),

    /// No colorspace could be determined for a lossless-filtered image.
    #[error("Could not determine colorspace of image {image}")]
    MissingColorspace { image: String },

    /// The filter chain / component count has no container variant.
    #[error("Unsupported image filters [{filters}] with {components} components")]
    UnsupportedFilter { filters: String, components: String },

    /// A filter in front of the kept filters could not be decoded.
    #[error("Stream decoding error: {0}")]
    StreamDecode(String),

    /// A length or offset does not fit the 32-bit fields of the container.
    #[error("Value {0} does not fit in a 32-bit container field")]
    LengthOverflow(u64),

    /// Writing the output container failed.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing a result or report failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::UnsupportedFilter`] from a filter chain.
    pub fn unsupported_filter(filters: &[String], components: Option<u8>) -> Self {
        Error::UnsupportedFilter {
            filters: filters.join(","),
            components: components
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }

    /// Whether an image was passed over because no container handles it,
    /// as opposed to failing while being written.
    pub fn is_unsupported_image(&self) -> bool {
        matches!(
            self,
            Error::MissingColorspace { .. } | Error::UnsupportedFilter { .. }
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::DocumentUnreadable {
            name: "book.pdf".to_string(),
            reason: "truncated xref".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Document book.pdf is unreadable: truncated xref"
        );
    }

    #[test]
    fn test_unsupported_filter_display() {
        let err = Error::unsupported_filter(&["JBIG2Decode".to_string()], None);
        assert_eq!(
            err.to_string(),
            "Unsupported image filters [JBIG2Decode] with unknown components"
        );
        assert!(err.is_unsupported_image());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_unsupported_image());
    }
}
