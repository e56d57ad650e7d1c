//! Content stream scanning for painted images.
//!
//! Only two things matter here: `/Name Do` and inline images
//! (`BI <dict> ID <data> EI`). Everything else is stepped over token by
//! token so that strings, arrays and dictionaries can never be mistaken for
//! operators. Inline image data is binary and is skipped without tokenizing.

use crate::error::{Error, Result};
use crate::model::Dimension;

/// An image painted by a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Painted {
    /// `Do` with the XObject resource name
    XObject(Vec<u8>),
    /// An inline image with its `/W` x `/H` ([`Dimension::EMPTY`] if absent)
    Inline(Dimension),
}

/// List the images painted by `input`, in drawing order.
///
/// # Errors
///
/// Returns [`Error::PdfParse`] for unterminated strings or inline images.
pub fn painted_images(input: &[u8]) -> Result<Vec<Painted>> {
    let mut painted = Vec::new();
    // operand directly in front of the next operator, if it is a name
    let mut last_name: Option<Vec<u8>> = None;
    let mut pos = 0;

    while pos < input.len() {
        skip_whitespace_and_comments(input, &mut pos);
        if pos >= input.len() {
            break;
        }

        match input[pos] {
            b'/' => {
                last_name = Some(parse_name(input, &mut pos));
                continue;
            }
            b'(' => skip_literal_string(input, &mut pos)?,
            b'<' if input.get(pos + 1) == Some(&b'<') => pos += 2,
            b'<' => skip_hex_string(input, &mut pos),
            b'0'..=b'9' | b'+' | b'-' | b'.' => skip_number(input, &mut pos),
            b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                match parse_keyword(input, &mut pos) {
                    b"Do" => {
                        if let Some(name) = last_name.take() {
                            painted.push(Painted::XObject(name));
                        }
                    }
                    b"BI" => painted.push(Painted::Inline(parse_inline_image(input, &mut pos)?)),
                    _ => {}
                }
            }
            // `]`, `>>`, braces and stray bytes
            _ => pos += 1,
        }
        last_name = None;
    }

    Ok(painted)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while *pos < input.len() {
        if is_whitespace(input[*pos]) {
            *pos += 1;
        } else if input[*pos] == b'%' {
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Balanced parentheses with backslash escapes.
fn skip_literal_string(input: &[u8], pos: &mut usize) -> Result<()> {
    *pos += 1;
    let mut depth = 1u32;
    while *pos < input.len() {
        match input[*pos] {
            b'\\' => *pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    *pos += 1;
                    return Ok(());
                }
            }
            _ => {}
        }
        *pos += 1;
    }
    Err(Error::PdfParse(
        "unterminated literal string in content stream".to_string(),
    ))
}

fn skip_hex_string(input: &[u8], pos: &mut usize) {
    while *pos < input.len() && input[*pos] != b'>' {
        *pos += 1;
    }
    *pos += 1;
}

fn skip_number(input: &[u8], pos: &mut usize) {
    *pos += 1;
    while *pos < input.len() && (input[*pos].is_ascii_digit() || input[*pos] == b'.') {
        *pos += 1;
    }
}

fn parse_number(input: &[u8], pos: &mut usize) -> Option<f64> {
    let start = *pos;
    skip_number(input, pos);
    std::str::from_utf8(&input[start..*pos]).ok()?.parse().ok()
}

/// A `/Name` with `#XX` escapes decoded, without the slash.
fn parse_name(input: &[u8], pos: &mut usize) -> Vec<u8> {
    *pos += 1;
    let start = *pos;
    while *pos < input.len() && !is_whitespace(input[*pos]) && !is_delimiter(input[*pos]) {
        *pos += 1;
    }

    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            let hex = std::str::from_utf8(&raw[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                name.push(byte);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }
    name
}

fn parse_keyword<'a>(input: &'a [u8], pos: &mut usize) -> &'a [u8] {
    let start = *pos;
    while *pos < input.len() {
        let b = input[*pos];
        if b.is_ascii_alphanumeric() || b == b'*' || b == b'\'' || b == b'"' {
            *pos += 1;
        } else {
            break;
        }
    }
    &input[start..*pos]
}

/// Step over one dictionary value of an inline image.
fn skip_value(input: &[u8], pos: &mut usize) -> Result<()> {
    match input[*pos] {
        b'/' => {
            parse_name(input, pos);
        }
        b'(' => skip_literal_string(input, pos)?,
        b'<' => skip_hex_string(input, pos),
        b'[' => {
            *pos += 1;
            loop {
                skip_whitespace_and_comments(input, pos);
                match input.get(*pos) {
                    None => {
                        return Err(Error::PdfParse(
                            "unterminated array in inline image".to_string(),
                        ))
                    }
                    Some(b']') => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => skip_value(input, pos)?,
                }
            }
        }
        b'0'..=b'9' | b'+' | b'-' | b'.' => skip_number(input, pos),
        b if b.is_ascii_alphabetic() => {
            parse_keyword(input, pos);
        }
        _ => *pos += 1,
    }
    Ok(())
}

/// Read the dictionary after `BI`, then skip the data up to `EI`.
fn parse_inline_image(input: &[u8], pos: &mut usize) -> Result<Dimension> {
    let mut width = 0i64;
    let mut height = 0i64;

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(Error::PdfParse(
                "inline image without ID in content stream".to_string(),
            ));
        }
        if input[*pos..].starts_with(b"ID")
            && input.get(*pos + 2).is_none_or(|&b| is_whitespace(b))
        {
            // one whitespace byte separates ID from the data
            *pos += 3;
            break;
        }
        if input[*pos] != b'/' {
            return Err(Error::PdfParse(format!(
                "unexpected byte {:#04x} in inline image dictionary",
                input[*pos]
            )));
        }

        let key = parse_name(input, pos);
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            break;
        }
        match key.as_slice() {
            b"W" | b"Width" => width = parse_number(input, pos).unwrap_or(0.0) as i64,
            b"H" | b"Height" => height = parse_number(input, pos).unwrap_or(0.0) as i64,
            _ => skip_value(input, pos)?,
        }
    }

    // EI must stand alone: whitespace before, whitespace or delimiter after
    let data_start = *pos;
    while *pos + 1 < input.len() {
        if input[*pos] == b'E'
            && input[*pos + 1] == b'I'
            && (*pos == data_start || is_whitespace(input[*pos - 1]))
            && input
                .get(*pos + 2)
                .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
        {
            *pos += 2;
            return Ok(Dimension::new(width, height));
        }
        *pos += 1;
    }

    Err(Error::PdfParse(
        "inline image without EI in content stream".to_string(),
    ))
}
