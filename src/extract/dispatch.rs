//! Mapping from an image's filter chain to an output container.

use crate::error::{Error, Result};

/// Output container chosen for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Fax-compressed bi-level TIFF, data copied through
    BiLevelTiff,
    /// Uncompressed one-sample TIFF
    GrayTiff,
    /// Uncompressed three-sample TIFF
    RgbTiff,
    /// The embedded JPEG stream
    Jpeg,
    /// The embedded JPEG2000 stream
    Jpeg2000,
}

const CCITT: &str = "CCITTFaxDecode";
const DCT: &str = "DCTDecode";
const JPX: &str = "JPXDecode";
const LOSSLESS: [&str; 3] = ["FlateDecode", "LZWDecode", "RunLengthDecode"];

impl ContainerKind {
    /// File suffix of the output.
    pub fn suffix(self) -> &'static str {
        match self {
            ContainerKind::BiLevelTiff | ContainerKind::GrayTiff | ContainerKind::RgbTiff => {
                "tiff"
            }
            ContainerKind::Jpeg => "jpg",
            ContainerKind::Jpeg2000 => "jpx",
        }
    }

    /// Filters left encoded when opening the image stream.
    pub fn kept_filters(self) -> &'static [&'static str] {
        match self {
            ContainerKind::BiLevelTiff => &[CCITT],
            ContainerKind::Jpeg => &[DCT],
            ContainerKind::Jpeg2000 => &[JPX],
            ContainerKind::GrayTiff | ContainerKind::RgbTiff => &[],
        }
    }

    /// Whether a TIFF header is synthesized (as opposed to a raw copy).
    pub fn is_tiff(self) -> bool {
        matches!(
            self,
            ContainerKind::BiLevelTiff | ContainerKind::GrayTiff | ContainerKind::RgbTiff
        )
    }
}

/// Choose the container for an image.
///
/// Filters are checked in order CCITT, DCT, JPX, then the lossless group,
/// which needs a known component count of 1 or 3.
pub fn dispatch(filters: &[String], components: Option<u8>) -> Result<ContainerKind> {
    let has = |name: &str| filters.iter().any(|f| f == name);

    if has(CCITT) {
        return Ok(ContainerKind::BiLevelTiff);
    }
    if has(DCT) {
        return Ok(ContainerKind::Jpeg);
    }
    if has(JPX) {
        return Ok(ContainerKind::Jpeg2000);
    }
    if LOSSLESS.iter().any(|f| has(f)) {
        match components {
            Some(1) => return Ok(ContainerKind::GrayTiff),
            Some(3) => return Ok(ContainerKind::RgbTiff),
            Some(_) => {}
            // the caller knows which image this is
            None => {
                return Err(Error::MissingColorspace {
                    image: "unknown".to_string(),
                })
            }
        }
    }
    Err(Error::unsupported_filter(filters, components))
}

/// File suffix an image would be written with, `None` when unsupported.
pub fn suffix_for(filters: &[String], components: Option<u8>) -> Option<&'static str> {
    dispatch(filters, components).ok().map(ContainerKind::suffix)
}
