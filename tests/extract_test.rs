//! Integration tests for image extraction.

mod common;

use std::collections::HashMap;
use std::io::Write;

use common::{fax_data, fax_dict, image_dict, PdfBuilder, LETTER};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Object};
use pdfscan::{extract_document, ExtractOptions, LopdfModel};

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// tag -> (count, value or offset)
fn tiff_fields(data: &[u8]) -> HashMap<u16, (u32, u32)> {
    assert_eq!(&data[..4], b"II\x2A\x00");
    let ifd = u32_at(data, 4) as usize;
    (0..u16_at(data, ifd) as usize)
        .map(|i| {
            let at = ifd + 2 + i * 12;
            (u16_at(data, at), (u32_at(data, at + 4), u32_at(data, at + 8)))
        })
        .collect()
}

fn tiff_string(data: &[u8], (count, offset): (u32, u32)) -> String {
    let start = offset as usize;
    String::from_utf8_lossy(&data[start..start + count as usize - 1]).into_owned()
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn extract(pdf: Vec<u8>, options: &ExtractOptions) -> pdfscan::ExtractionReport {
    let model = LopdfModel::load_bytes(&pdf, "test.pdf").unwrap();
    extract_document(&model, options).unwrap()
}

#[test]
fn test_fax_image_to_tiff() {
    let strip = fax_data(500);
    let mut pdf = PdfBuilder::new();
    let image = pdf.image(fax_dict(2550, 3300), strip.clone());
    pdf.page(Some(LETTER), &[("Im0", image)]);
    pdf.info(&[
        ("Producer", "Book Scanner 3000"),
        ("CreationDate", "D:20190412093000Z"),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let options = ExtractOptions::new().with_output_dir(dir.path());
    let report = extract(pdf.build(), &options);

    assert_eq!(report.extracted, 1);
    assert_eq!(report.outputs, vec![dir.path().join("image_001.tiff")]);

    let tiff = std::fs::read(&report.outputs[0]).unwrap();
    let fields = tiff_fields(&tiff);
    assert_eq!(fields[&256].1, 2550);
    assert_eq!(fields[&257].1, 3300);
    assert_eq!(fields[&259].1, 4);
    assert_eq!(fields[&279].1, 500);
    let offset = fields[&273].1 as usize;
    assert_eq!(offset, tiff.len() - strip.len());
    assert_eq!(&tiff[offset..], &strip[..]);

    assert_eq!(u32_at(&tiff, fields[&282].1 as usize), 300);
    assert_eq!(tiff_string(&tiff, fields[&305]), "Book Scanner 3000");
    assert_eq!(tiff_string(&tiff, fields[&306]), "2019:04:12 09:30:00");
}

#[test]
fn test_jpeg_copied_byte_for_byte() {
    let jpeg: Vec<u8> = [0xFF, 0xD8, 0xFF, 0xE0]
        .into_iter()
        .chain((0..200).map(|i| i as u8))
        .chain([0xFF, 0xD9])
        .collect();
    let mut pdf = PdfBuilder::new();
    let mut dict = image_dict(640, 480, "DCTDecode");
    dict.set("ColorSpace", "DeviceRGB");
    let image = pdf.image(dict, jpeg.clone());
    pdf.page(Some(LETTER), &[("Im0", image)]);

    let dir = tempfile::tempdir().unwrap();
    let report = extract(pdf.build(), &ExtractOptions::new().with_output_dir(dir.path()));

    assert_eq!(report.extracted, 1);
    assert!(report.outputs[0].to_string_lossy().ends_with("image_001.jpg"));
    assert_eq!(std::fs::read(&report.outputs[0]).unwrap(), jpeg);
}

#[test]
fn test_flate_gray_to_uncompressed_tiff() {
    let pixels: Vec<u8> = (0..64u8).collect();
    let mut pdf = PdfBuilder::new();
    let mut dict = image_dict(8, 8, "FlateDecode");
    dict.set("ColorSpace", "DeviceGray");
    let image = pdf.image(dict, zlib(&pixels));
    pdf.page(Some(LETTER), &[("Im0", image)]);

    let dir = tempfile::tempdir().unwrap();
    let options = ExtractOptions::new()
        .with_output_dir(dir.path())
        .with_default_producer("fallback producer");
    let report = extract(pdf.build(), &options);

    assert_eq!(report.extracted, 1);
    let tiff = std::fs::read(&report.outputs[0]).unwrap();
    let fields = tiff_fields(&tiff);
    assert_eq!(fields[&259].1, 1);
    assert_eq!(fields[&262].1, 1);
    assert_eq!(fields[&279].1, 64);
    assert!(tiff.ends_with(&pixels));
    assert_eq!(tiff_string(&tiff, fields[&305]), "fallback producer");
    assert!(!fields.contains_key(&306));
}

#[test]
fn test_flate_rgb_to_tiff() {
    let pixels: Vec<u8> = (0..48u8).collect();
    let mut pdf = PdfBuilder::new();
    let mut dict = image_dict(4, 4, "FlateDecode");
    dict.set("ColorSpace", "DeviceRGB");
    let image = pdf.image(dict, zlib(&pixels));
    pdf.page(Some(LETTER), &[("Im0", image)]);

    let dir = tempfile::tempdir().unwrap();
    let report = extract(pdf.build(), &ExtractOptions::new().with_output_dir(dir.path()));

    let tiff = std::fs::read(&report.outputs[0]).unwrap();
    let fields = tiff_fields(&tiff);
    assert_eq!(fields[&277].1, 3);
    assert_eq!(fields[&262].1, 2);
    assert_eq!(fields[&258].0, 3);
    assert!(tiff.ends_with(&pixels));
}

#[test]
fn test_unsupported_images_are_skipped() {
    let mut pdf = PdfBuilder::new();
    let jbig2 = pdf.image(image_dict(100, 100, "JBIG2Decode"), vec![0; 10]);
    // lossless without colorspace
    let bare = pdf.image(image_dict(2, 2, "FlateDecode"), zlib(&[0, 1, 2, 3]));
    let mut cmyk_dict = image_dict(1, 1, "FlateDecode");
    cmyk_dict.set("ColorSpace", "DeviceCMYK");
    let cmyk = pdf.image(cmyk_dict, zlib(&[0, 0, 0, 0]));
    pdf.page(Some(LETTER), &[("Im0", jbig2), ("Im1", bare), ("Im2", cmyk)]);

    let dir = tempfile::tempdir().unwrap();
    let report = extract(pdf.build(), &ExtractOptions::new().with_output_dir(dir.path()));

    assert_eq!(report.extracted, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_shared_image_extracted_once() {
    let mut pdf = PdfBuilder::new();
    let image = pdf.image(fax_dict(2550, 3300), fax_data(32));
    let other = pdf.image(fax_dict(2550, 3300), fax_data(40));
    pdf.page(Some(LETTER), &[("Im0", image)]);
    pdf.page(Some(LETTER), &[("Im0", image)]);
    pdf.page(Some(LETTER), &[("Im0", other)]);

    let dir = tempfile::tempdir().unwrap();
    let options = ExtractOptions::new()
        .with_output_dir(dir.path())
        .with_prefix("book")
        .with_first_index(10);
    let report = extract(pdf.build(), &options);

    assert_eq!(report.extracted, 2);
    assert_eq!(
        report.outputs,
        vec![dir.path().join("book_010.tiff"), dir.path().join("book_011.tiff")]
    );
}

#[test]
fn test_modification_date_fallback() {
    let mut pdf = PdfBuilder::new();
    let image = pdf.image(fax_dict(100, 100), fax_data(8));
    pdf.page(Some(LETTER), &[("Im0", image)]);
    pdf.info(&[("ModDate", "D:20200101120000+01'00'")]);

    let dir = tempfile::tempdir().unwrap();
    let report = extract(pdf.build(), &ExtractOptions::new().with_output_dir(dir.path()));

    let tiff = std::fs::read(&report.outputs[0]).unwrap();
    let fields = tiff_fields(&tiff);
    assert!(!fields.contains_key(&305));
    assert_eq!(tiff_string(&tiff, fields[&306]), "2020:01:01 11:00:00");
}

#[test]
fn test_missing_output_dir_fails_per_image() {
    let mut pdf = PdfBuilder::new();
    let a = pdf.image(fax_dict(100, 100), fax_data(8));
    let b = pdf.image(fax_dict(100, 100), fax_data(8));
    pdf.page(Some(LETTER), &[("Im0", a), ("Im1", b)]);

    let dir = tempfile::tempdir().unwrap();
    let options = ExtractOptions::new().with_output_dir(dir.path().join("missing"));
    let report = extract(pdf.build(), &options);

    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 2);
}

#[test]
fn test_image_mask_metadata() {
    use pdfscan::backend::DocumentModel;

    let mut pdf = PdfBuilder::new();
    let mask = pdf.image(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 16i64,
            "Height" => 16i64,
            "ImageMask" => true,
            "Filter" => vec![Object::Name(b"AHx".to_vec()), Object::Name(b"CCF".to_vec())],
            "DecodeParms" => vec![
                Object::Null,
                Object::Dictionary(dictionary! { "K" => 0i64, "BlackIs1" => true }),
            ],
        },
        b"00>".to_vec(),
    );
    pdf.page(Some(LETTER), &[("Im0", mask)]);
    let model = LopdfModel::load_bytes(&pdf.build(), "mask.pdf").unwrap();

    let meta = model.image_metadata(mask).unwrap();
    assert_eq!(meta.bits_per_component, 1);
    assert_eq!(meta.components, Some(1));
    assert_eq!(meta.filters, vec!["ASCIIHexDecode", "CCITTFaxDecode"]);
    assert_eq!(meta.fax.k, 0);
    assert!(meta.fax.black_is_1);

    let mut stream = model.open_stream(mask, &["CCITTFaxDecode"]).unwrap();
    let mut data = Vec::new();
    std::io::Read::read_to_end(&mut stream.reader, &mut data).unwrap();
    assert_eq!(data, vec![0x00]);
    assert_eq!(stream.length, Some(1));
}

#[test]
fn test_extract_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.4\ngarbage").unwrap();
    let err = pdfscan::extract_images(&path, &ExtractOptions::new()).unwrap_err();
    assert!(matches!(err, pdfscan::Error::DocumentUnreadable { .. }));
}

#[test]
fn test_predicted_flate_in_front_of_kept_filter_fails() {
    use pdfscan::backend::DocumentModel;

    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xD9];
    let mut pdf = PdfBuilder::new();
    let image = pdf.image(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 8i64,
            "Height" => 8i64,
            "BitsPerComponent" => 8i64,
            "ColorSpace" => "DeviceRGB",
            "Filter" => vec![
                Object::Name(b"FlateDecode".to_vec()),
                Object::Name(b"DCTDecode".to_vec()),
            ],
            "DecodeParms" => vec![
                Object::Dictionary(dictionary! { "Predictor" => 12i64, "Columns" => 8i64 }),
                Object::Null,
            ],
        },
        zlib(&jpeg),
    );
    pdf.page(Some(LETTER), &[("Im0", image)]);
    let data = pdf.build();

    let model = LopdfModel::load_bytes(&data, "predicted.pdf").unwrap();
    assert!(matches!(
        model.open_stream(image, &["DCTDecode"]),
        Err(pdfscan::Error::StreamDecode(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let report = extract(data, &ExtractOptions::new().with_output_dir(dir.path()));
    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
