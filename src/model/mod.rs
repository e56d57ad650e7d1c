//! Value types shared by classification and extraction.
//!
//! All of them are short-lived: created per document, page or image and
//! dropped once the verdict or the output file is produced.

mod dimension;
mod histogram;
mod image;
mod sample;

pub use dimension::Dimension;
pub use histogram::{DpiBucket, DpiHistogram};
pub use image::{DocumentInfo, FaxParams, ImageMetadata, ImageRecord, Resolution};
pub use sample::{density, PageSample};
