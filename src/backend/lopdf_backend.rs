//! [`DocumentModel`] implementation backed by `lopdf::Document`.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::content::{painted_images, Painted};
use super::filters;
use super::{DocumentModel, EncodedStream, ImageKey, ImageRef, ObjectKey, Scope, XObject};
use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{Dimension, DocumentInfo, FaxParams, ImageMetadata};

/// US Letter, used when no MediaBox can be found.
const DEFAULT_MEDIA_BOX: (f32, f32) = (612.0, 792.0);

/// A PDF loaded with lopdf.
pub struct LopdfModel {
    doc: LopdfDocument,
    name: String,
}

impl LopdfModel {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::checked(doc, name)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], name: impl Into<String>) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::checked(doc, name.into())
    }

    fn checked(doc: LopdfDocument, name: String) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        log::debug!("Loaded {} (PDF {})", name, doc.version);
        Ok(Self { doc, name })
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    fn stream(&self, key: ObjectKey) -> Result<&lopdf::Stream> {
        self.doc
            .get_object(key)
            .and_then(|o| o.as_stream())
            .map_err(|e| Error::MissingObject(format!("stream {:?}: {}", key, e)))
    }

    /// Look up a page attribute, walking up the page tree via /Parent.
    fn inherited(&self, page: ObjectKey, key: &[u8]) -> Result<Option<&Object>> {
        let mut current = page;
        // bounded: a broken tree may loop
        for _ in 0..64 {
            let dict = self
                .doc
                .get_dictionary(current)
                .map_err(|e| Error::MissingObject(format!("page node {:?}: {}", current, e)))?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(self.resolve(value)));
            }
            match dict.get(b"Parent").and_then(|p| p.as_reference()) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn resources(&self, scope: Scope) -> Result<Option<&Dictionary>> {
        match scope {
            Scope::Page(page) => Ok(self
                .inherited(page, b"Resources")?
                .and_then(|obj| self.resolve_dict(obj))),
            Scope::Form(form) => Ok(self
                .stream(form)?
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|obj| self.resolve_dict(obj))),
        }
    }

    fn xobject_dict(&self, scope: Scope) -> Result<Option<&Dictionary>> {
        Ok(self
            .resources(scope)?
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj)))
    }

    /// Turn a resource entry into an [`XObject`], `None` for anything else.
    fn classify(&self, name: &[u8], obj: &Object) -> Option<XObject> {
        // streams are always indirect, the reference is the identity
        let key = obj.as_reference().ok()?;
        let stream = self.doc.get_object(key).ok()?.as_stream().ok()?;
        let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
        match subtype {
            b"Image" => {
                let width = dict_i64(&stream.dict, b"Width").unwrap_or(0);
                let height = dict_i64(&stream.dict, b"Height").unwrap_or(0);
                Some(XObject::Image(ImageRef {
                    key: ImageKey::Object(key),
                    name: String::from_utf8_lossy(name).into_owned(),
                    dimension: Dimension::new(width, height),
                }))
            }
            b"Form" => Some(XObject::Form(key)),
            _ => None,
        }
    }

    fn content_of(&self, scope: Scope) -> Result<Vec<u8>> {
        match scope {
            Scope::Page(page) => {
                let dict = self
                    .doc
                    .get_dictionary(page)
                    .map_err(|e| Error::MissingObject(format!("page {:?}: {}", page, e)))?;
                let Ok(contents) = dict.get(b"Contents") else {
                    return Ok(Vec::new());
                };
                match self.resolve(contents) {
                    Object::Stream(stream) => decode_content(stream),
                    Object::Array(parts) => {
                        let mut content = Vec::new();
                        for part in parts {
                            let stream = self.resolve(part).as_stream().map_err(|e| {
                                Error::PdfParse(format!("/Contents item is not a stream: {}", e))
                            })?;
                            if !content.is_empty() {
                                content.push(b' ');
                            }
                            content.extend_from_slice(&decode_content(stream)?);
                        }
                        Ok(content)
                    }
                    _ => Err(Error::PdfParse(
                        "/Contents is not a stream or array".to_string(),
                    )),
                }
            }
            Scope::Form(form) => decode_content(self.stream(form)?),
        }
    }

    fn components(&self, dict: &Dictionary) -> Option<u8> {
        if dict
            .get(b"ImageMask")
            .and_then(|o| o.as_bool())
            .unwrap_or(false)
        {
            return Some(1);
        }
        let cs = dict.get(b"ColorSpace").ok()?;
        self.colorspace_components(self.resolve(cs))
    }

    fn colorspace_components(&self, cs: &Object) -> Option<u8> {
        match cs {
            Object::Name(name) => device_components(name),
            Object::Array(items) => {
                let family = self.resolve(items.first()?).as_name().ok()?;
                match family {
                    b"ICCBased" => {
                        let profile = self.resolve_dict(items.get(1)?)?;
                        dict_i64(profile, b"N").map(|n| n as u8)
                    }
                    b"Indexed" | b"I" | b"Separation" | b"CalGray" => Some(1),
                    b"CalRGB" | b"Lab" => Some(3),
                    b"DeviceN" => self
                        .resolve(items.get(1)?)
                        .as_array()
                        .ok()
                        .map(|names| names.len() as u8),
                    other => device_components(other),
                }
            }
            _ => None,
        }
    }

    fn filter_names(&self, dict: &Dictionary) -> Vec<String> {
        let Ok(filter) = dict.get(b"Filter") else {
            return Vec::new();
        };
        let names = match self.resolve(filter) {
            Object::Name(name) => vec![name.clone()],
            Object::Array(items) => items
                .iter()
                .filter_map(|o| self.resolve(o).as_name().ok().map(<[u8]>::to_vec))
                .collect(),
            _ => Vec::new(),
        };
        names
            .iter()
            .map(|n| filters::canonical_name(&String::from_utf8_lossy(n)).to_string())
            .collect()
    }

    /// `/DecodeParms` of the filter at `index` in the chain.
    fn decode_parms<'a>(&'a self, dict: &'a Dictionary, index: usize) -> Option<&'a Dictionary> {
        let parms = dict.get(b"DecodeParms").or_else(|_| dict.get(b"DP")).ok()?;
        match self.resolve(parms) {
            Object::Array(items) => items.get(index).and_then(|o| self.resolve_dict(o)),
            other => self.resolve_dict(other),
        }
    }

    fn fax_params(&self, dict: &Dictionary, filters: &[String]) -> FaxParams {
        let Some(index) = filters.iter().position(|f| f == "CCITTFaxDecode") else {
            return FaxParams::default();
        };
        match self.decode_parms(dict, index) {
            Some(parms) => FaxParams {
                k: dict_i64(parms, b"K").unwrap_or(0),
                black_is_1: parms
                    .get(b"BlackIs1")
                    .and_then(|o| o.as_bool())
                    .unwrap_or(false),
            },
            None => {
                log::warn!("{}: CCITT image without DecodeParms", self.name);
                FaxParams::default()
            }
        }
    }
}

impl DocumentModel for LopdfModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn pages(&self) -> Result<Vec<ObjectKey>> {
        Ok(self.doc.get_pages().into_values().collect())
    }

    fn page_dimension(&self, page: ObjectKey) -> Result<Dimension> {
        let (width, height) = match self.inherited(page, b"MediaBox")? {
            Some(Object::Array(coords)) if coords.len() >= 4 => {
                let n: Vec<f32> = coords
                    .iter()
                    .map(|c| number(self.resolve(c)).unwrap_or(0.0))
                    .collect();
                ((n[2] - n[0]).abs(), (n[3] - n[1]).abs())
            }
            _ => {
                log::debug!("{}: page {:?} has no MediaBox", self.name, page);
                DEFAULT_MEDIA_BOX
            }
        };
        Ok(Dimension::new(width as i64, height as i64))
    }

    fn page_user_unit(&self, page: ObjectKey) -> f32 {
        self.doc
            .get_dictionary(page)
            .ok()
            .and_then(|dict| dict.get(b"UserUnit").ok())
            .and_then(|unit| number(self.resolve(unit)))
            .unwrap_or(1.0)
    }

    fn xobjects(&self, scope: Scope) -> Result<Vec<XObject>> {
        let Some(xobjects) = self.xobject_dict(scope)? else {
            return Ok(Vec::new());
        };
        Ok(xobjects
            .iter()
            .filter_map(|(name, obj)| self.classify(name, obj))
            .collect())
    }

    fn drawn_xobjects(&self, scope: Scope) -> Result<Vec<XObject>> {
        let data = self.content_of(scope)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let xobjects = self.xobject_dict(scope)?;

        let mut drawn = Vec::new();
        for painted in painted_images(&data)? {
            match painted {
                Painted::Inline(dimension) => drawn.push(XObject::Image(ImageRef {
                    key: ImageKey::Inline,
                    name: "inline".to_string(),
                    dimension,
                })),
                Painted::XObject(name) => match xobjects.and_then(|dict| dict.get(&name).ok()) {
                    Some(obj) => drawn.extend(self.classify(&name, obj)),
                    None => log::warn!(
                        "{}: missing XObject /{} in {:?}",
                        self.name,
                        String::from_utf8_lossy(&name),
                        scope
                    ),
                },
            }
        }
        Ok(drawn)
    }

    fn image_metadata(&self, image: ObjectKey) -> Result<ImageMetadata> {
        let dict = &self.stream(image)?.dict;
        let filters = self.filter_names(dict);
        let image_mask = dict
            .get(b"ImageMask")
            .and_then(|o| o.as_bool())
            .unwrap_or(false);
        let bits_per_component = if image_mask {
            1
        } else {
            dict_i64(dict, b"BitsPerComponent").unwrap_or(8) as u8
        };
        let fax = self.fax_params(dict, &filters);

        Ok(ImageMetadata {
            width: dict_i64(dict, b"Width").unwrap_or(0).max(0) as u32,
            height: dict_i64(dict, b"Height").unwrap_or(0).max(0) as u32,
            bits_per_component,
            components: self.components(dict),
            filters,
            fax,
        })
    }

    fn open_stream(&self, image: ObjectKey, keep: &[&str]) -> Result<EncodedStream<'_>> {
        let stream = self.stream(image)?;
        let chain = self.filter_names(&stream.dict);
        let stop = chain
            .iter()
            .position(|f| keep.contains(&f.as_str()))
            .unwrap_or(chain.len());

        if stop == 0 {
            return Ok(EncodedStream::from_vec(stream.content.clone()));
        }
        if stop == chain.len() {
            match stream.decompressed_content() {
                Ok(data) => return Ok(EncodedStream::from_vec(data)),
                Err(e) => log::debug!(
                    "{}: lopdf could not decode {:?} ({}), using own decoders",
                    self.name,
                    image,
                    e
                ),
            }
        }

        let mut data = stream.content.clone();
        for (index, filter) in chain[..stop].iter().enumerate() {
            let predictor = self
                .decode_parms(&stream.dict, index)
                .and_then(|parms| dict_i64(parms, b"Predictor"))
                .unwrap_or(1);
            data = filters::decode(filter, &data, predictor)?;
        }
        Ok(EncodedStream::from_vec(data))
    }

    fn info(&self) -> DocumentInfo {
        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| self.resolve_dict(obj));
        let Some(info) = info else {
            return DocumentInfo::default();
        };
        DocumentInfo {
            producer: string_from_dict(info, b"Producer"),
            created: string_from_dict(info, b"CreationDate").and_then(|d| parse_pdf_date(&d)),
            modified: string_from_dict(info, b"ModDate").and_then(|d| parse_pdf_date(&d)),
        }
    }
}

fn decode_content(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn dict_i64(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|o| o.as_i64().ok())
}

fn device_components(name: &[u8]) -> Option<u8> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Some(1),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(3),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        _ => None,
    }
}

/// Decode a text string (UTF-16BE with BOM, UTF-8, or Latin-1).
fn string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    // O is '+', '-' or 'Z', followed by HH'mm
    let offset_minutes: i64 = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let hours: i64 = s.get(15..17).and_then(|h| h.parse().ok()).unwrap_or(0);
            let minutes: i64 = s.get(18..20).and_then(|m| m.parse().ok()).unwrap_or(0);
            let total = hours * 60 + minutes;
            if sign == "-" {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    let local =
        chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let utc = local - chrono::Duration::minutes(offset_minutes);
    Some(chrono::DateTime::from_naive_utc_and_offset(utc, chrono::Utc))
}
