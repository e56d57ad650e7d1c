//! Writing one image record into its output container.

use std::io::{self, BufRead, BufReader, Read, Write};

use super::dispatch::ContainerKind;
use super::tiff::TiffImage;
use crate::detect::{sniff_container, ContainerFormat};
use crate::error::{Error, Result};
use crate::model::ImageRecord;

/// Write `record` as a `kind` container. Returns the number of bytes
/// written.
///
/// The record's stream must be encoded with exactly
/// [`ContainerKind::kept_filters`].
pub fn write_container<R: Read, W: Write>(
    kind: ContainerKind,
    record: ImageRecord<R>,
    out: &mut W,
) -> Result<u64> {
    match kind {
        ContainerKind::BiLevelTiff => write_bilevel(record, out),
        ContainerKind::GrayTiff => write_uncompressed(record, 1, out),
        ContainerKind::RgbTiff => write_uncompressed(record, 3, out),
        ContainerKind::Jpeg => pass_through(record.data, ContainerFormat::Jpeg, out),
        ContainerKind::Jpeg2000 => pass_through(record.data, ContainerFormat::Jpeg2000, out),
    }
}

fn write_bilevel<R: Read, W: Write>(mut record: ImageRecord<R>, out: &mut W) -> Result<u64> {
    let meta = &record.metadata;
    let image = TiffImage::bilevel(meta.width, meta.height, meta.fax.k, meta.fax.black_is_1)
        .with_resolution(record.resolution)
        .with_software(record.producer.take())
        .with_date_time(record.creation_date);

    let Some(length) = record.data_length else {
        // unknown length: the strip byte count needs the whole buffer
        let mut data = Vec::new();
        record.data.read_to_end(&mut data)?;
        return write_buffered(&image, &data, out);
    };

    let header = image.header(length)?;
    out.write_all(&header)?;
    let copied = io::copy(&mut record.data, out)?;
    if copied != length {
        return Err(Error::StreamDecode(format!(
            "fax stream announced {} bytes, got {}",
            length, copied
        )));
    }
    log::debug!("bi-level strip of {} bytes", copied);
    Ok(header.len() as u64 + copied)
}

fn write_uncompressed<R: Read, W: Write>(
    mut record: ImageRecord<R>,
    samples: u16,
    out: &mut W,
) -> Result<u64> {
    let meta = &record.metadata;
    let image = TiffImage::uncompressed(
        meta.width,
        meta.height,
        meta.bits_per_component as u16,
        samples,
    )
    .with_resolution(record.resolution)
    .with_software(record.producer.take())
    .with_date_time(record.creation_date);

    let row_bits = meta.width as u64 * meta.bits_per_component as u64 * samples as u64;
    let expected = row_bits.div_ceil(8) * meta.height as u64;

    let mut data = Vec::new();
    record.data.read_to_end(&mut data)?;
    if data.len() as u64 != expected {
        log::warn!(
            "decoded {} bytes for a {}x{} image, expected {}",
            data.len(),
            meta.width,
            meta.height,
            expected
        );
    }
    write_buffered(&image, &data, out)
}

fn write_buffered<W: Write>(image: &TiffImage, data: &[u8], out: &mut W) -> Result<u64> {
    let header = image.header(data.len() as u64)?;
    out.write_all(&header)?;
    out.write_all(data)?;
    Ok((header.len() + data.len()) as u64)
}

fn pass_through<R: Read, W: Write>(data: R, expected: ContainerFormat, out: &mut W) -> Result<u64> {
    let mut reader = BufReader::new(data);
    let head = reader.fill_buf()?;
    if !head.is_empty() && sniff_container(head) != Some(expected) {
        log::warn!("stream does not look like {:?}, copying anyway", expected);
    }
    Ok(io::copy(&mut reader, out)?)
}
