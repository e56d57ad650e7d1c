//! Image and document metadata handed over by the document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;

use super::sample::effective_user_unit;
use super::Dimension;

/// `/DecodeParms` of a CCITTFaxDecode stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaxParams {
    /// `/K`: negative for Group 4, zero for Group 3 1D, positive for mixed
    pub k: i64,
    /// `/BlackIs1`
    pub black_is_1: bool,
}

/// Stored image properties, obtainable without decoding pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bits per colour component
    pub bits_per_component: u8,
    /// Components per pixel, `None` when no colorspace could be determined
    pub components: Option<u8>,
    /// Filter chain in application order (e.g. `["FlateDecode"]`)
    pub filters: Vec<String>,
    /// CCITT parameters (defaults when absent)
    pub fax: FaxParams,
}

impl ImageMetadata {
    /// Create metadata for an image with a single filter.
    pub fn new(width: u32, height: u32, filter: impl Into<String>) -> Self {
        Self {
            width,
            height,
            bits_per_component: 8,
            components: None,
            filters: vec![filter.into()],
            fax: FaxParams::default(),
        }
    }

    /// Set bits per component.
    pub fn with_bits_per_component(mut self, bits: u8) -> Self {
        self.bits_per_component = bits;
        self
    }

    /// Set the component count.
    pub fn with_components(mut self, components: u8) -> Self {
        self.components = Some(components);
        self
    }

    /// Set the CCITT parameters.
    pub fn with_fax(mut self, fax: FaxParams) -> Self {
        self.fax = fax;
        self
    }

    /// Pixel dimension of the image.
    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width as i64, self.height as i64)
    }
}

/// Resolution written into TIFF containers, in whole dots per inch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Horizontal DPI
    pub x: u32,
    /// Vertical DPI
    pub y: u32,
}

impl Resolution {
    /// Create a resolution.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Estimate the resolution of an image laid over a whole page.
    ///
    /// Values are truncated; an empty page axis yields 0 on that axis.
    pub fn from_geometry(image: &Dimension, page: &Dimension, user_unit: f32) -> Self {
        let unit = effective_user_unit(user_unit);
        let axis = |pixels: i64, points: i64| -> u32 {
            if points <= 0 {
                return 0;
            }
            (pixels as f64 / points as f64 * 72.0 / unit) as u32
        };
        Self {
            x: axis(image.width, page.width),
            y: axis(image.height, page.height),
        }
    }
}

/// Document information dictionary entries used in containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// `/Producer`
    pub producer: Option<String>,
    /// `/CreationDate`
    pub created: Option<DateTime<Utc>>,
    /// `/ModDate`
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    /// Creation date, falling back to the modification date.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.created.or(self.modified)
    }
}

/// One image ready for container synthesis. Consumed once.
pub struct ImageRecord<R> {
    /// Stored image properties
    pub metadata: ImageMetadata,
    /// Encoded (or partially decoded) image bytes
    pub data: R,
    /// Byte length of `data` when known up front
    pub data_length: Option<u64>,
    /// Resolution for the container
    pub resolution: Resolution,
    /// Producer string, emitted by TIFF variants
    pub producer: Option<String>,
    /// Creation date, emitted by TIFF variants
    pub creation_date: Option<DateTime<Utc>>,
}

impl<R: Read> ImageRecord<R> {
    /// Create a record without resolution or document info.
    pub fn new(metadata: ImageMetadata, data: R, data_length: Option<u64>) -> Self {
        Self {
            metadata,
            data,
            data_length,
            resolution: Resolution::default(),
            producer: None,
            creation_date: None,
        }
    }

    /// Set the resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the producer.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Set the creation date.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }
}
