//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub const LETTER: (i64, i64) = (612, 792);

/// Builds small PDFs page by page.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    pages_media_box: Option<(i64, i64)>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            pages_media_box: None,
        }
    }

    /// MediaBox set on the page tree root, inherited by pages without one.
    pub fn inherited_media_box(mut self, size: (i64, i64)) -> Self {
        self.pages_media_box = Some(size);
        self
    }

    /// Add an image XObject.
    pub fn image(&mut self, dict: Dictionary, data: Vec<u8>) -> ObjectId {
        self.doc.add_object(Stream::new(dict, data))
    }

    /// Add a form XObject drawing `xobjects` in order.
    pub fn form(&mut self, xobjects: &[(&str, ObjectId)]) -> ObjectId {
        let content = draw_all(xobjects);
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()],
            "Resources" => dictionary! { "XObject" => xobject_dict(xobjects) },
        };
        self.doc.add_object(Stream::new(dict, content.into_bytes()))
    }

    /// Add a page listing and drawing `xobjects`.
    pub fn page(&mut self, size: Option<(i64, i64)>, xobjects: &[(&str, ObjectId)]) -> ObjectId {
        let content = draw_all(xobjects);
        self.page_with_content(size, xobjects, &content, None)
    }

    /// Add a page with an explicit content stream and optional /UserUnit.
    pub fn page_with_content(
        &mut self,
        size: Option<(i64, i64)>,
        xobjects: &[(&str, ObjectId)],
        content: &str,
        user_unit: Option<f32>,
    ) -> ObjectId {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobject_dict(xobjects) },
        };
        if let Some((w, h)) = size {
            page.set("MediaBox", media_box(w, h));
        }
        if let Some(unit) = user_unit {
            page.set("UserUnit", Object::Real(unit));
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        page_id
    }

    /// Set the document information dictionary.
    pub fn info(&mut self, entries: &[(&str, &str)]) {
        let mut info = Dictionary::new();
        for (key, value) in entries {
            info.set(
                *key,
                Object::String(value.as_bytes().to_vec(), StringFormat::Literal),
            );
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);
    }

    pub fn build(mut self) -> Vec<u8> {
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids.clone(),
            "Count" => self.kids.len() as i64,
        };
        if let Some((w, h)) = self.pages_media_box {
            pages.set("MediaBox", media_box(w, h));
        }
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}

fn media_box(w: i64, h: i64) -> Object {
    vec![0i64.into(), 0i64.into(), w.into(), h.into()].into()
}

fn xobject_dict(xobjects: &[(&str, ObjectId)]) -> Dictionary {
    let mut dict = Dictionary::new();
    for (name, id) in xobjects {
        dict.set(*name, *id);
    }
    dict
}

fn draw_all(xobjects: &[(&str, ObjectId)]) -> String {
    xobjects
        .iter()
        .map(|(name, _)| format!("q 612 0 0 792 0 0 cm /{} Do Q", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Image dictionary with a single filter.
pub fn image_dict(width: i64, height: i64, filter: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "BitsPerComponent" => 8i64,
        "Filter" => filter,
    }
}

/// Group 4 fax image dictionary.
pub fn fax_dict(width: i64, height: i64) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "BitsPerComponent" => 1i64,
        "ColorSpace" => "DeviceGray",
        "Filter" => "CCITTFaxDecode",
        "DecodeParms" => dictionary! {
            "K" => -1i64,
            "Columns" => width,
            "Rows" => height,
        },
    }
}

/// Placeholder fax payload; never decoded.
pub fn fax_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

/// A letter-size book whose every page is a 300 dpi fax scan.
pub fn scanned_book(pages: usize) -> Vec<u8> {
    let mut pdf = PdfBuilder::new();
    for _ in 0..pages {
        let image = pdf.image(fax_dict(2550, 3300), fax_data(64));
        pdf.page(Some(LETTER), &[("Im0", image)]);
    }
    pdf.build()
}
