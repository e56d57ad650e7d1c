//! Lossless extraction of embedded images.
//!
//! Fax images get a synthesized bi-level TIFF around their original data,
//! losslessly compressed greyscale and RGB images an uncompressed TIFF, and
//! JPEG/JPEG2000 streams are copied as they are.

mod container;
mod dispatch;
mod document;
mod options;
pub mod tiff;

pub use container::write_container;
pub use dispatch::{dispatch, suffix_for, ContainerKind};
pub use document::{extract_document, extract_file};
pub use options::{ExtractOptions, ExtractionReport};
