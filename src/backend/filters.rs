//! Decoders for the filters that may sit in front of a kept filter.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{Error, Result};

/// Expand the abbreviated filter names allowed in inline images.
pub fn canonical_name(name: &str) -> &str {
    match name {
        "Fl" => "FlateDecode",
        "LZW" => "LZWDecode",
        "RL" => "RunLengthDecode",
        "AHx" => "ASCIIHexDecode",
        "A85" => "ASCII85Decode",
        "CCF" => "CCITTFaxDecode",
        "DCT" => "DCTDecode",
        other => other,
    }
}

/// Apply one decoding filter.
///
/// `predictor` is the filter's `/Predictor` (1 when absent). Predicted
/// Flate data is refused rather than returned with its rows still encoded.
pub fn decode(filter: &str, data: &[u8], predictor: i64) -> Result<Vec<u8>> {
    match filter {
        "FlateDecode" if predictor > 1 => Err(Error::StreamDecode(format!(
            "FlateDecode: predictor {} is not supported",
            predictor
        ))),
        "FlateDecode" => flate(data),
        "ASCIIHexDecode" => ascii_hex(data),
        "RunLengthDecode" => run_length(data),
        other => Err(Error::StreamDecode(format!(
            "no decoder for {} in front of a kept filter",
            other
        ))),
    }
}

fn flate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::StreamDecode(format!("FlateDecode: {}", e)))?;
    Ok(out)
}

fn ascii_hex(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;
    for &byte in data {
        if byte == b'>' {
            break;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }
        let nibble = (byte as char)
            .to_digit(16)
            .ok_or_else(|| Error::StreamDecode(format!("ASCIIHexDecode: bad digit {:#04x}", byte)))?
            as u8;
        match high.take() {
            Some(h) => out.push(h << 4 | nibble),
            None => high = Some(nibble),
        }
    }
    // odd digit count: trailing 0 assumed
    if let Some(h) = high {
        out.push(h << 4);
    }
    Ok(out)
}

fn run_length(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;
    while i < data.len() {
        let length = data[i] as usize;
        i += 1;
        match length {
            128 => break,
            0..=127 => {
                let end = i + length + 1;
                let literal = data
                    .get(i..end)
                    .ok_or_else(|| Error::StreamDecode("RunLengthDecode: truncated run".into()))?;
                out.extend_from_slice(literal);
                i = end;
            }
            _ => {
                let byte = *data
                    .get(i)
                    .ok_or_else(|| Error::StreamDecode("RunLengthDecode: truncated run".into()))?;
                out.extend(std::iter::repeat(byte).take(257 - length));
                i += 1;
            }
        }
    }
    Ok(out)
}
