//! Little-endian single-strip TIFF header synthesis.
//!
//! Layout: 8-byte file header, one field directory, a data area holding
//! every value too large for its field, then the strip itself.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::Resolution;

/// TIFF tag numbers used here.
pub mod tag {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC: u16 = 262;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const ROWS_PER_STRIP: u16 = 278;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const X_RESOLUTION: u16 = 282;
    pub const Y_RESOLUTION: u16 = 283;
    pub const RESOLUTION_UNIT: u16 = 296;
    pub const SOFTWARE: u16 = 305;
    pub const DATE_TIME: u16 = 306;
}

/// Compression identifiers.
pub mod compression {
    pub const NONE: u16 = 1;
    pub const CCITT_T4: u16 = 3;
    pub const CCITT_T6: u16 = 4;
}

/// Photometric interpretations.
pub mod photometric {
    pub const WHITE_IS_ZERO: u16 = 0;
    pub const BLACK_IS_ZERO: u16 = 1;
    pub const RGB: u16 = 2;
}

const RESOLUTION_UNIT_INCH: u16 = 2;
const FILE_HEADER_LEN: u32 = 8;
const FIELD_LEN: u32 = 12;

/// Field value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
}

impl FieldType {
    /// Size of one value in bytes.
    pub fn size(self) -> u32 {
        match self {
            FieldType::Ascii => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    /// Fits in the 4-byte value slot
    Inline(u32),
    /// Stored in the data area, patched with its offset at layout
    Deferred(Vec<u8>),
    /// Patched with the total header length at layout
    StripOffset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    tag: u16,
    field_type: FieldType,
    count: u32,
    value: Value,
}

/// Incrementally built field table.
///
/// Fields are written in insertion order, so callers add them with
/// ascending tags. Deferred values land in the data area in the same order,
/// each starting on an even offset.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<Field>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn short(&mut self, tag: u16, value: u16) -> &mut Self {
        self.push(tag, FieldType::Short, 1, Value::Inline(value as u32))
    }

    pub fn shorts(&mut self, tag: u16, values: &[u16]) -> &mut Self {
        match values {
            [single] => self.short(tag, *single),
            [a, b] => {
                let packed = (*a as u32) | ((*b as u32) << 16);
                self.push(tag, FieldType::Short, 2, Value::Inline(packed))
            }
            _ => {
                let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
                self.push(tag, FieldType::Short, values.len() as u32, Value::Deferred(bytes))
            }
        }
    }

    pub fn long(&mut self, tag: u16, value: u32) -> &mut Self {
        self.push(tag, FieldType::Long, 1, Value::Inline(value))
    }

    pub fn rational(&mut self, tag: u16, numerator: u32, denominator: u32) -> &mut Self {
        let mut bytes = numerator.to_le_bytes().to_vec();
        bytes.extend_from_slice(&denominator.to_le_bytes());
        self.push(tag, FieldType::Rational, 1, Value::Deferred(bytes))
    }

    /// NUL-terminated 7-bit string; other characters become `?`.
    pub fn ascii(&mut self, tag: u16, text: &str) -> &mut Self {
        let mut bytes: Vec<u8> = text
            .chars()
            .map(|c| if c.is_ascii() && c != '\0' { c as u8 } else { b'?' })
            .collect();
        bytes.push(0);
        let count = bytes.len() as u32;
        let value = if bytes.len() <= 4 {
            bytes.resize(4, 0);
            Value::Inline(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        } else {
            Value::Deferred(bytes)
        };
        self.push(tag, FieldType::Ascii, count, value)
    }

    /// Placeholder for the strip offset, resolved at layout.
    pub fn strip_offset(&mut self, tag: u16) -> &mut Self {
        self.push(tag, FieldType::Long, 1, Value::StripOffset)
    }

    fn push(&mut self, tag: u16, field_type: FieldType, count: u32, value: Value) -> &mut Self {
        self.fields.push(Field {
            tag,
            field_type,
            count,
            value,
        });
        self
    }

    /// Lay out file header, directory and data area.
    ///
    /// The strip offset placeholder is patched to the returned length.
    pub fn layout(&self) -> Result<Vec<u8>> {
        let directory_len = 2 + FIELD_LEN * self.fields.len() as u32 + 4;
        let data_start = FILE_HEADER_LEN + directory_len;

        let mut data = Vec::new();
        let mut offsets = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Value::Deferred(bytes) = &field.value {
                offsets.push(Some(data_start + data.len() as u32));
                data.extend_from_slice(bytes);
                if data.len() % 2 == 1 {
                    data.push(0);
                }
            } else {
                offsets.push(None);
            }
        }
        let header_len = u64::from(data_start) + data.len() as u64;
        let header_len = u32::try_from(header_len).map_err(|_| Error::LengthOverflow(header_len))?;

        let mut out = Vec::with_capacity(header_len as usize);
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&FILE_HEADER_LEN.to_le_bytes());

        out.extend_from_slice(&(self.fields.len() as u16).to_le_bytes());
        for (field, offset) in self.fields.iter().zip(offsets) {
            out.extend_from_slice(&field.tag.to_le_bytes());
            out.extend_from_slice(&(field.field_type as u16).to_le_bytes());
            out.extend_from_slice(&field.count.to_le_bytes());
            let slot = match (&field.value, offset) {
                (Value::Inline(v), _) => *v,
                (Value::StripOffset, _) => header_len,
                (Value::Deferred(_), Some(offset)) => offset,
                (Value::Deferred(_), None) => 0,
            };
            out.extend_from_slice(&slot.to_le_bytes());
        }
        // single directory
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&data);

        debug_assert_eq!(out.len() as u32, header_len);
        Ok(out)
    }
}

/// Parameters of a synthesized TIFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiffImage {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub compression: u16,
    pub photometric: u16,
    pub resolution: Resolution,
    pub software: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
}

impl TiffImage {
    /// Header for a fax-compressed bi-level image.
    pub fn bilevel(width: u32, height: u32, k: i64, black_is_1: bool) -> Self {
        Self {
            width,
            height,
            bits_per_sample: 1,
            samples_per_pixel: 1,
            compression: if k < 0 {
                compression::CCITT_T6
            } else {
                compression::CCITT_T4
            },
            photometric: if black_is_1 {
                photometric::BLACK_IS_ZERO
            } else {
                photometric::WHITE_IS_ZERO
            },
            resolution: Resolution::default(),
            software: None,
            date_time: None,
        }
    }

    /// Header for uncompressed samples.
    pub fn uncompressed(width: u32, height: u32, bits_per_sample: u16, samples: u16) -> Self {
        Self {
            width,
            height,
            bits_per_sample,
            samples_per_pixel: samples,
            compression: compression::NONE,
            photometric: if samples == 3 {
                photometric::RGB
            } else {
                photometric::BLACK_IS_ZERO
            },
            resolution: Resolution::default(),
            software: None,
            date_time: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_software(mut self, software: Option<String>) -> Self {
        self.software = software;
        self
    }

    pub fn with_date_time(mut self, date_time: Option<DateTime<Utc>>) -> Self {
        self.date_time = date_time;
        self
    }

    /// Build the field table for a strip of `strip_byte_count` bytes.
    pub fn fields(&self, strip_byte_count: u64) -> Result<FieldTable> {
        let strip_byte_count = u32::try_from(strip_byte_count)
            .map_err(|_| Error::LengthOverflow(strip_byte_count))?;

        let bits = vec![self.bits_per_sample; self.samples_per_pixel.max(1) as usize];
        let mut table = FieldTable::new();
        table
            .long(tag::IMAGE_WIDTH, self.width)
            .long(tag::IMAGE_LENGTH, self.height)
            .shorts(tag::BITS_PER_SAMPLE, &bits)
            .short(tag::COMPRESSION, self.compression)
            .short(tag::PHOTOMETRIC, self.photometric)
            .strip_offset(tag::STRIP_OFFSETS);
        if self.samples_per_pixel > 1 {
            table.short(tag::SAMPLES_PER_PIXEL, self.samples_per_pixel);
        }
        table
            .long(tag::ROWS_PER_STRIP, self.height)
            .long(tag::STRIP_BYTE_COUNTS, strip_byte_count)
            .rational(tag::X_RESOLUTION, self.resolution.x, 1)
            .rational(tag::Y_RESOLUTION, self.resolution.y, 1)
            .short(tag::RESOLUTION_UNIT, RESOLUTION_UNIT_INCH);
        if let Some(software) = &self.software {
            table.ascii(tag::SOFTWARE, software);
        }
        if let Some(date) = &self.date_time {
            table.ascii(tag::DATE_TIME, &format_date_time(date));
        }
        Ok(table)
    }

    /// Serialized header; the strip must follow it directly.
    pub fn header(&self, strip_byte_count: u64) -> Result<Vec<u8>> {
        self.fields(strip_byte_count)?.layout()
    }
}

/// `YYYY:MM:DD HH:MM:SS`
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%Y:%m:%d %H:%M:%S").to_string()
}
