//! Document model abstraction layer.
//!
//! Classification and extraction only talk to a [`DocumentModel`]: page
//! enumeration, page geometry, one-level XObject listings and raw image
//! streams. [`LopdfModel`] is the concrete implementation backed by lopdf.

mod content;
mod filters;
mod lopdf_backend;
mod walk;

pub use content::{painted_images, Painted};
pub use lopdf_backend::LopdfModel;
pub use walk::{walk_drawn, walk_resources, ImageRegistry, Walk, MAX_FORM_DEPTH};

use std::io::Read;

use crate::error::Result;
use crate::model::{Dimension, DocumentInfo, ImageMetadata};

/// Object identifier: (object number, generation number).
pub type ObjectKey = (u32, u16);

/// A node whose resources (and content) can hold images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A page, resources inherited through the page tree
    Page(ObjectKey),
    /// A form XObject
    Form(ObjectKey),
}

/// Identity of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKey {
    /// An image XObject stream
    Object(ObjectKey),
    /// An inline image; every occurrence is a distinct image
    Inline,
}

impl ImageKey {
    /// The stream object of an image XObject.
    pub fn object(self) -> Option<ObjectKey> {
        match self {
            ImageKey::Object(key) => Some(key),
            ImageKey::Inline => None,
        }
    }
}

/// An image as seen from a resource dictionary or a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Identity of the image
    pub key: ImageKey,
    /// Resource name (e.g. "Im0"), "inline" for inline images
    pub name: String,
    /// Stored `/Width` x `/Height`, [`Dimension::EMPTY`] if absent
    pub dimension: Dimension,
}

/// One XObject entry of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XObject {
    /// An image (inline images only come from content streams)
    Image(ImageRef),
    /// A form XObject that may hold more images
    Form(ObjectKey),
}

/// An image stream opened with some filters kept encoded.
pub struct EncodedStream<'a> {
    /// The bytes, still encoded with the kept filters
    pub reader: Box<dyn Read + 'a>,
    /// Byte length of `reader` when known up front
    pub length: Option<u64>,
}

impl<'a> EncodedStream<'a> {
    /// Wrap an in-memory buffer.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let length = Some(data.len() as u64);
        Self {
            reader: Box::new(std::io::Cursor::new(data)),
            length,
        }
    }
}

/// Abstract interface to a loaded PDF document.
///
/// Implementations must expose image metadata without decoding pixels.
pub trait DocumentModel {
    /// Name used in log messages and reports (usually the file name).
    fn name(&self) -> &str;

    /// All pages in page-tree order.
    fn pages(&self) -> Result<Vec<ObjectKey>>;

    /// MediaBox of a page, truncated to whole points.
    fn page_dimension(&self, page: ObjectKey) -> Result<Dimension>;

    /// `/UserUnit` of a page (1.0 when absent).
    fn page_user_unit(&self, page: ObjectKey) -> f32;

    /// XObjects listed in the resources of `scope`, in dictionary order.
    fn xobjects(&self, scope: Scope) -> Result<Vec<XObject>>;

    /// XObjects and inline images painted by the content stream of `scope`,
    /// in drawing order. An XObject painted twice appears twice.
    fn drawn_xobjects(&self, scope: Scope) -> Result<Vec<XObject>>;

    /// Stored properties of an image.
    fn image_metadata(&self, image: ObjectKey) -> Result<ImageMetadata>;

    /// Open an image stream, decoding every filter before the first one
    /// named in `keep`.
    fn open_stream(&self, image: ObjectKey, keep: &[&str]) -> Result<EncodedStream<'_>>;

    /// Document information dictionary.
    fn info(&self) -> DocumentInfo;
}
